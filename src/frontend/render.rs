//! Minimal server-side pages. Every interpolated string is escaped.

use std::fmt::Write as _;

use jive_search::Pagination;

use crate::config::BrandConfig;
use crate::orchestrator::{SearchPage, StartPage};
use crate::query::QueryContext;

/// Escape HTML special characters.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn head(brand: &BrandConfig, title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>\
         <link rel=\"search\" type=\"application/opensearchdescription+xml\" href=\"/opensearch.xml\" title=\"{}\">\
         </head><body>",
        html_escape(title),
        html_escape(&brand.name)
    )
}

fn search_form(q: &str) -> String {
    format!(
        "<form action=\"/\" method=\"get\"><input type=\"search\" name=\"q\" value=\"{}\" autofocus>\
         <button type=\"submit\">Search</button></form>",
        html_escape(q)
    )
}

pub(crate) fn start_page(page: &StartPage) -> String {
    let mut html = head(&page.brand, &page.brand.name);
    let _ = write!(
        html,
        "<h1>{}</h1><p>{}</p>{}",
        html_escape(&page.brand.name),
        html_escape(&page.brand.tagline),
        search_form("")
    );
    if !page.bangs.is_empty() {
        html.push_str("<ul class=\"bangs\">");
        for bang in &page.bangs {
            let _ = write!(
                html,
                "<li><img src=\"{}\" alt=\"\" width=\"16\" height=\"16\"> !{} {}</li>",
                html_escape(&bang.favicon),
                html_escape(&bang.trigger),
                html_escape(&bang.name)
            );
        }
        html.push_str("</ul>");
    }
    html.push_str("</body></html>");
    html
}

fn page_link(ctx: &QueryContext, page: usize, label: &str) -> String {
    let q: String = url::form_urlencoded::byte_serialize(ctx.raw.as_bytes()).collect();
    format!(
        "<a href=\"/?q={q}&amp;t={}&amp;p={page}\">{}</a>",
        ctx.tab.as_str(),
        html_escape(label)
    )
}

fn pagination(html: &mut String, ctx: &QueryContext, p: &Pagination) {
    if p.anchors.len() < 2 {
        return;
    }
    html.push_str("<nav>");
    if let Some(prev) = p.previous {
        html.push_str(&page_link(ctx, prev, "Previous"));
    }
    for &n in &p.anchors {
        if n == p.page {
            let _ = write!(html, " <b>{n}</b> ");
        } else {
            html.push(' ');
            html.push_str(&page_link(ctx, n, &n.to_string()));
            html.push(' ');
        }
    }
    if let Some(next) = p.next {
        html.push_str(&page_link(ctx, next, "Next"));
    }
    html.push_str("</nav>");
}

/// The `search` and `maps` layouts.
pub(crate) fn search_page(page: &SearchPage) -> String {
    let ctx = &page.context;
    let mut html = head(&page.brand, &format!("{} - {}", ctx.raw, page.brand.name));
    html.push_str(&search_form(&ctx.raw));

    let answer = &page.results.instant;
    if answer.triggered {
        let _ = write!(
            html,
            "<section class=\"instant\" data-type=\"{}\">{}</section>",
            html_escape(answer.type_tag()),
            html_escape(&answer.solution.headline())
        );
    }

    if let Some(search) = &page.results.search {
        html.push_str("<ol class=\"results\">");
        for doc in &search.documents {
            let _ = write!(
                html,
                "<li><a href=\"{}\">{}</a><p>{}</p></li>",
                html_escape(&doc.url),
                html_escape(&doc.title),
                html_escape(&doc.description)
            );
        }
        html.push_str("</ol>");
        pagination(&mut html, ctx, &search.pagination);
    }

    if let Some(images) = &page.results.images {
        html.push_str("<div class=\"images\">");
        for img in &images.images {
            let src = match &img.base64 {
                Some(b64) => format!("data:{};base64,{b64}", img.mime),
                None => img.url.clone(),
            };
            let _ = write!(
                html,
                "<a href=\"{}\"><img src=\"{}\" alt=\"{}\"></a>",
                html_escape(&img.url),
                html_escape(&src),
                html_escape(&img.alt)
            );
        }
        html.push_str("</div>");
        pagination(&mut html, ctx, &images.pagination);
    }

    html.push_str("</body></html>");
    html
}

/// OpenSearch description pointing at `/` and `/autocomplete` under `base_url`.
pub(crate) fn opensearch(brand: &BrandConfig, base_url: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <OpenSearchDescription xmlns=\"http://a9.com/-/spec/opensearch/1.1/\">\n\
         <ShortName>{name}</ShortName>\n\
         <Description>{tagline}</Description>\n\
         <InputEncoding>UTF-8</InputEncoding>\n\
         <Url type=\"text/html\" method=\"get\" template=\"{base}/?q={{searchTerms}}\"/>\n\
         <Url type=\"application/x-suggestions+json\" template=\"{base}/autocomplete?q={{searchTerms}}\"/>\n\
         </OpenSearchDescription>\n",
        name = html_escape(&brand.name),
        tagline = html_escape(&brand.tagline),
        base = html_escape(base_url),
    )
}
