// SPDX-License-Identifier: Apache-2.0

//! HTML dashboard rendered from an [`AggregateReport`].

use bijux_conformance_model::{ImplementationMethod, Outcome, ReviewStatus};

use crate::aggregate::{AggregateReport, Breakdown, GroupSummary, TestEntry};

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin:.5em 0 1.5em}\
th,td{border:1px solid #ccc;padding:.25em .6em;text-align:right}\
th:first-child,td:first-child{text-align:left}\
.pass{color:#1a7f37}.fail{color:#cf222e}.skip{color:#9a6700}.unresolved{color:#8250df}\
article.test{border-top:1px solid #ddd;padding:.5em 0}\
dt{font-weight:bold;float:left;width:12em}dd{margin-left:12em}";

/// Escapes text for HTML element content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[must_use]
pub fn render_dashboard(report: &AggregateReport) -> String {
    let title = escape(&report.context.title);
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"));
    out.push_str(&format!("<h1>{title}</h1>\n"));
    out.push_str(&format!(
        "<p class=\"meta\">Subject: {} | Generated: {}</p>\n",
        escape(&report.context.subject_name),
        escape(&report.context.timestamp)
    ));

    render_summary(&mut out, report);
    for group in &report.groups {
        render_group(&mut out, group);
    }
    render_details(&mut out, report);
    render_unresolved(&mut out, report);

    out.push_str("</body>\n</html>\n");
    out
}

fn render_summary(out: &mut String, report: &AggregateReport) {
    out.push_str("<section id=\"summary\">\n<h2>Summary</h2>\n");
    out.push_str(TABLE_HEAD);
    for level in &report.levels {
        if level.breakdown.counts.total == 0 {
            continue;
        }
        let groups = level
            .groups
            .iter()
            .map(|group| {
                let info = report.group(group);
                let (anchor, title) = info
                    .map(|g| (g.anchor.as_str(), g.title.as_str()))
                    .unwrap_or(("", group.as_str()));
                format!("<a href=\"#{}\">{}</a>", escape(anchor), escape(title))
            })
            .collect::<Vec<_>>()
            .join(", ");
        breakdown_row(out, level.level.as_str(), &level.breakdown);
        out.push_str(&format!(
            "<tr class=\"groups\"><td colspan=\"9\">{groups}</td></tr>\n"
        ));
    }
    breakdown_row(out, "Total", &report.totals);
    out.push_str("</table>\n");

    out.push_str("<h3>Review status</h3>\n<table>\n<tr><th>Level</th>");
    for status in ReviewStatus::ALL {
        out.push_str(&format!("<th>{}</th>", status.label()));
    }
    out.push_str("</tr>\n");
    for level in report.levels.iter().filter(|l| l.breakdown.counts.total > 0) {
        out.push_str(&format!("<tr><td>{}</td>", level.level.as_str()));
        for status in ReviewStatus::ALL {
            let count = level.breakdown.by_status.get(&status).copied().unwrap_or(0);
            out.push_str(&format!("<td>{count}</td>"));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");

    out.push_str("<h3>Implementation method</h3>\n<table>\n<tr><th>Method</th><th>Tests</th></tr>\n");
    for method in ImplementationMethod::ALL {
        let count = report.totals.by_method.get(&method).copied().unwrap_or(0);
        out.push_str(&format!(
            "<tr><td>{}</td><td>{count}</td></tr>\n",
            method_label(method)
        ));
    }
    out.push_str("</table>\n</section>\n");
}

const TABLE_HEAD: &str = "<table>\n<tr><th>Level</th><th>Tests</th><th>Pass</th><th>Fail</th><th>Skip</th>\
<th>Unresolved</th><th>Requirements</th><th>Covered</th><th>Passed</th></tr>\n";

fn breakdown_row(out: &mut String, label: &str, breakdown: &Breakdown) {
    let c = &breakdown.counts;
    let r = &breakdown.requirements;
    out.push_str(&format!(
        "<tr><td>{}</td><td>{}</td><td class=\"pass\">{}</td><td class=\"fail\">{}</td>\
<td class=\"skip\">{}</td><td class=\"unresolved\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        escape(label),
        c.total,
        c.pass,
        c.fail,
        c.skip,
        c.unresolved,
        r.requirements_total,
        r.requirements_covered,
        r.requirements_passed
    ));
}

fn render_group(out: &mut String, group: &GroupSummary) {
    out.push_str(&format!(
        "<section class=\"group\" id=\"{}\">\n<h2>{}</h2>\n",
        escape(&group.anchor),
        escape(&group.title)
    ));
    if !group.description.is_empty() {
        out.push_str(&format!("<p>{}</p>\n", escape(&group.description)));
    }
    out.push_str(TABLE_HEAD);
    for bucket in &group.buckets {
        breakdown_row(out, bucket.level.as_str(), &bucket.breakdown);
    }
    breakdown_row(out, "Total", &group.breakdown);
    out.push_str("</table>\n");
    for bucket in &group.buckets {
        let links = bucket
            .tests
            .iter()
            .map(|id| format!("<a href=\"#{0}\">{0}</a>", escape(id.anchor())))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("<p>{}: {links}</p>\n", bucket.level.as_str()));
    }
    out.push_str("</section>\n");
}

fn render_details(out: &mut String, report: &AggregateReport) {
    out.push_str("<section id=\"tests\">\n<h2>Test details</h2>\n");
    for test in &report.tests {
        render_test(out, test);
    }
    out.push_str("</section>\n");
}

fn render_test(out: &mut String, test: &TestEntry) {
    out.push_str(&format!(
        "<article class=\"test\" id=\"{0}\">\n<h3>{0}</h3>\n<dl>\n",
        escape(test.id.anchor())
    ));
    let mut field = |name: &str, value: String| {
        out.push_str(&format!("<dt>{name}</dt><dd>{value}</dd>\n"));
    };
    field("Test", escape(&format!("{}.{}", test.group, test.method)));
    if !test.description.is_empty() {
        field("Description", escape(&test.description));
    }
    let levels = test
        .levels
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    field(
        "Levels",
        if levels.is_empty() {
            "unclassified".to_string()
        } else {
            levels
        },
    );
    field("Outcome", outcome_cell(test));
    if let Some(diagnostic) = &test.diagnostic {
        field("Diagnostic", format!("<pre>{}</pre>", escape(diagnostic)));
    }
    let reference = escape(&test.spec_ref);
    if is_linkable(&test.spec_ref) {
        field("Specification", format!("<a href=\"{reference}\">{reference}</a>"));
    } else {
        field("Specification", reference);
    }
    field("Review status", test.status.label().to_string());
    field("Method", method_label(test.implementation).to_string());
    if !test.evidence.is_empty() {
        let links = test
            .evidence
            .iter()
            .map(|id| format!("<a href=\"#{0}\">{0}</a>", escape(id.anchor())))
            .collect::<Vec<_>>()
            .join(", ");
        field("Resolved from", links);
    }
    out.push_str("</dl>\n</article>\n");
}

const LINK_SCHEMES: [&str; 3] = ["http://", "https://", "urn:"];

/// Only web and URN references become `href`s; anything else is shown as text.
fn is_linkable(reference: &str) -> bool {
    !reference.chars().any(char::is_whitespace)
        && LINK_SCHEMES.iter().any(|scheme| {
            reference
                .get(..scheme.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
        })
}

fn outcome_cell(test: &TestEntry) -> String {
    match (test.outcome, test.unresolved) {
        (Some(Outcome::Pass), _) => "<span class=\"pass\">pass</span>".to_string(),
        (Some(Outcome::Fail), _) => "<span class=\"fail\">fail</span>".to_string(),
        (Some(Outcome::Skip), _) => "<span class=\"skip\">skip</span>".to_string(),
        (None, Some(reason)) => format!(
            "<span class=\"unresolved\">unresolved ({})</span>",
            reason.label()
        ),
        (None, None) => "<span class=\"unresolved\">unresolved</span>".to_string(),
    }
}

fn method_label(method: ImplementationMethod) -> &'static str {
    match method {
        ImplementationMethod::Automated => "Automated",
        ImplementationMethod::Manual => "Manual",
        ImplementationMethod::ClientOnly => "Client only",
        ImplementationMethod::NotImplemented => "Not implemented",
        ImplementationMethod::Indirect => "Indirect",
    }
}

fn render_unresolved(out: &mut String, report: &AggregateReport) {
    out.push_str("<section id=\"unresolved\">\n<h2>Unresolved</h2>\n");
    if report.unresolved.is_empty() {
        out.push_str("<p>None.</p>\n");
    } else {
        out.push_str("<ul>\n");
        for entry in &report.unresolved {
            out.push_str(&format!(
                "<li><a href=\"#{0}\">{0}</a> ({1}): {2}</li>\n",
                escape(entry.id.anchor()),
                entry.reason.label(),
                escape(&entry.detail)
            ));
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</section>\n");
}
