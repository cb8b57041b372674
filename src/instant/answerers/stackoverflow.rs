use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, not_configured, prefix_or_suffix, Answerer, MatchResult};
use crate::query::QueryContext;

/// Tokens that route a query to Stack Overflow. Matched as a prefix or
/// suffix of the query.
const TAGS: &[&str] = &[
    "ajax", "android", "angular", "angularjs", "apache", "asp.net", "bash", "c", "c++", "c#",
    "css", "css3", "csv", "database", "django", "eclipse", "elasticsearch", "excel", "git",
    "golang", "go", "html", "html5", "ios", "iphone", "java", "javascript", "jquery", "json",
    "linux", "macos", "mac os", "matlab", "mongodb", "mysql", ".net", "node.js", "objective-c",
    "oracle", "php", "perl", "postgresql", "python", "r", "reactjs", "redis", "regex", "regexp",
    "ruby-on-rails", "ruby", "scala", "selenium", "spring", "sql", "sqlite", "swift", "vba",
    "vue.js", "windows", "wordpress", "xml",
];

/// The canonical tag for a trigger token.
pub fn tag_for(trigger: &str) -> &str {
    match trigger {
        "golang" => "go",
        "mac os" => "macos",
        "regexp" => "regex",
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedAnswer {
    pub user: String,
    pub score: i64,
    pub body: String,
}

/// A question from the search API with its answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub title: String,
    pub link: String,
    pub answers: Vec<PostedAnswer>,
}

#[async_trait]
pub trait StackOverflowFetcher: Send + Sync {
    /// Questions ranked by relevance, each with at least one answer.
    async fn search(&self, query: &str, tags: &[&str]) -> Result<Vec<Question>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoAnswer {
    pub user: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOverflowAnswer {
    pub question: String,
    pub link: String,
    pub answer: SoAnswer,
}

impl StackOverflowAnswer {
    /// The highest-scored answer across `questions`. Ties go to the later one.
    pub fn best(questions: &[Question]) -> Option<Self> {
        questions
            .iter()
            .flat_map(|q| q.answers.iter().map(move |a| (q, a)))
            .max_by_key(|(_, a)| a.score)
            .map(|(q, a)| Self {
                question: q.title.clone(),
                link: q.link.clone(),
                answer: SoAnswer {
                    user: a.user.clone(),
                    text: a.body.clone(),
                },
            })
    }
}

pub struct StackOverflow {
    patterns: Vec<Regex>,
    fetcher: Option<Arc<dyn StackOverflowFetcher>>,
}

impl StackOverflow {
    pub fn new(fetcher: Option<Arc<dyn StackOverflowFetcher>>) -> Result<Self> {
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(TAGS))?,
            fetcher,
        })
    }
}

#[async_trait]
impl Answerer for StackOverflow {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Stackoverflow
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| not_configured("stack overflow"))?;
        let questions = fetcher.search(&m.remainder, &[tag_for(&m.trigger)]).await?;
        StackOverflowAnswer::best(&questions)
            .map(Solution::StackOverflow)
            .ok_or_else(|| JiveError::InvalidInput("no answered question".into()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl StackOverflowFetcher for Recorder {
        async fn search(&self, query: &str, tags: &[&str]) -> Result<Vec<Question>> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_owned(), tags.join(",")));
            let answer = |user: &str, score| PostedAnswer {
                user: user.into(),
                score,
                body: format!("<p>{user}</p>"),
            };
            Ok(vec![Question {
                title: "How to loop?".into(),
                link: "https://stackoverflow.com/q/1".into(),
                answers: vec![answer("a", 3), answer("b", 51), answer("c", 7)],
            }])
        }
    }

    #[tokio::test]
    async fn picks_top_answer_with_canonical_tag() {
        let rec = Arc::new(Recorder::default());
        let so = StackOverflow::new(Some(rec.clone())).unwrap();
        let m = so.matches("regexp loop").unwrap();
        let Solution::StackOverflow(a) = so.solve(&m, &QueryContext::new("regexp loop")).await.unwrap()
        else {
            panic!("expected an answer");
        };
        assert_eq!(a.answer.user, "b");
        assert_eq!(a.question, "How to loop?");
        assert_eq!(rec.calls.lock().unwrap()[0], ("loop".to_owned(), "regex".to_owned()));
    }

    #[test]
    fn suffix_and_multiword_tags() {
        let so = StackOverflow::new(None).unwrap();
        let m = so.matches("loop over files mac os").unwrap();
        assert_eq!(tag_for(&m.trigger), "macos");
        assert_eq!(m.remainder, "loop over files");
        assert_eq!(tag_for(&so.matches("golang channels").unwrap().trigger), "go");
        assert!(so.matches("gopher").is_none());
    }

    #[test]
    fn no_answers() {
        assert!(StackOverflowAnswer::best(&[]).is_none());
    }
}
