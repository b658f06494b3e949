use std::fmt::Write;

use paper_core::{DownloadKind, DownloadStatus, PageStatus, PageViewModel, Selector};

/// Plain-text rendering of the whole view: header, papers, pagination strip
/// and the download line.
pub fn render(view: &PageViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", header(view));

    match view.status {
        PageStatus::Idle if view.selector.is_none() => {
            let _ = writeln!(out, "Pick a category with `cat <code>` or search with `search <text>`.");
        }
        PageStatus::Loading if view.papers.is_empty() => {
            let _ = writeln!(out, "Loading...");
        }
        PageStatus::Error => {
            let message = view.error.as_deref().unwrap_or("unknown error");
            let _ = writeln!(out, "Error: {message}");
        }
        _ => {}
    }

    // A failed fetch keeps the last good page on screen below the error.
    if !view.papers.is_empty() {
        out.push_str(&render_papers(view));
    } else if view.status == PageStatus::Loaded {
        let _ = writeln!(out, "No papers found.");
    }

    if !view.pages.is_empty() {
        let _ = writeln!(out, "Pages: {}", render_pages(view));
    }

    if let Some(line) = download_line(view) {
        let _ = writeln!(out, "{line}");
    }
    out
}

fn header(view: &PageViewModel) -> String {
    let status = match view.status {
        PageStatus::Idle => "idle",
        PageStatus::Loading => "loading",
        PageStatus::Loaded => "loaded",
        PageStatus::Error => "error",
    };
    match &view.selector {
        Some(Selector::Category(category)) => format!(
            "== {category} ({status}, {} entries) ==",
            view.total_entries
        ),
        Some(Selector::Search(query)) => {
            format!("== search \"{query}\" ({status}, {} results) ==", view.total_entries)
        }
        None => "== paper browser ==".to_string(),
    }
}

/// Numbered from the first entry of the page, so `get N` matches what is shown.
fn render_papers(view: &PageViewModel) -> String {
    let mut out = String::new();
    for (index, paper) in view.papers.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", index + 1, paper.title);
        if !paper.authors.is_empty() {
            let _ = writeln!(out, "     {}", paper.authors);
        }
        if !paper.subjects_or_abstract.is_empty() {
            let _ = writeln!(out, "     {}", first_line(&paper.subjects_or_abstract, 160));
        }
        let _ = writeln!(out, "     {}", paper.pdf_url);
    }
    out
}

fn render_pages(view: &PageViewModel) -> String {
    view.pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            if page.is_active {
                format!("[{}:{}]", index + 1, page.label)
            } else {
                format!("{}:{}", index + 1, page.label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn download_line(view: &PageViewModel) -> Option<String> {
    let job = view.download.as_ref()?;
    let what = match job.kind {
        DownloadKind::Single => "PDF",
        DownloadKind::Bulk => "archive",
    };
    let line = match job.status {
        DownloadStatus::InFlight => format!("Downloading {what}..."),
        DownloadStatus::Done => match &job.message {
            Some(location) => format!("Saved {what} to {location}"),
            None => format!("Saved {what}"),
        },
        DownloadStatus::Failed => format!(
            "Download of {what} failed: {}",
            job.message.as_deref().unwrap_or("unknown error")
        ),
    };
    Some(line)
}

fn first_line(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= max_chars {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}
