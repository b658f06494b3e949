use crate::{BulkItem, DownloadKind, Effect, Msg, PageState, PageStatus, Selector};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PageState, msg: Msg) -> (PageState, Vec<Effect>) {
    let effects = match msg {
        Msg::CategorySelected(category) => {
            let category = category.trim();
            if category.is_empty() {
                return (state, Vec::new());
            }
            change_selector(&mut state, Selector::Category(category.to_string()))
        }
        Msg::SearchSubmitted(query) => {
            // Whitespace-only queries never reach the search endpoint.
            let query = query.trim();
            if query.is_empty() {
                return (state, Vec::new());
            }
            change_selector(&mut state, Selector::Search(query.to_string()))
        }
        Msg::PageSelected(skip) => select_page(&mut state, skip),
        Msg::NextPage => match state.skip().checked_add(state.page_size()) {
            Some(skip) => select_page(&mut state, skip),
            None => Vec::new(),
        },
        Msg::PreviousPage => match state.skip().checked_sub(state.page_size()) {
            Some(skip) => select_page(&mut state, skip),
            None => Vec::new(),
        },
        Msg::Refresh => state.start_fetch().into_iter().collect(),
        Msg::NavigatedAway => {
            if state.selector().is_some() {
                state.leave();
            }
            Vec::new()
        }
        Msg::ListingLoaded {
            generation,
            papers,
            total_entries,
        } => {
            if !state.is_current(generation)
                || !matches!(state.selector(), Some(Selector::Category(_)))
            {
                return (state, Vec::new());
            }
            state.apply_listing(papers, total_entries);
            if state.clamp_skip() {
                state.start_fetch().into_iter().collect()
            } else {
                Vec::new()
            }
        }
        Msg::SearchLoaded { generation, papers } => {
            if !state.is_current(generation)
                || !matches!(state.selector(), Some(Selector::Search(_)))
            {
                return (state, Vec::new());
            }
            state.apply_search(papers);
            Vec::new()
        }
        Msg::FetchFailed {
            generation,
            message,
        } => {
            if state.is_current(generation) {
                state.apply_failure(message);
            }
            Vec::new()
        }
        Msg::DownloadClicked { index } => {
            if state.download_in_flight() {
                return (state, Vec::new());
            }
            let Some(paper) = state.items().get(index).cloned() else {
                return (state, Vec::new());
            };
            state.start_download(DownloadKind::Single);
            vec![Effect::DownloadSingle {
                pdf_url: paper.pdf_url,
                title: paper.title,
            }]
        }
        Msg::DownloadRequested { pdf_url, title } => {
            let pdf_url = pdf_url.trim();
            if state.download_in_flight() || pdf_url.is_empty() {
                return (state, Vec::new());
            }
            state.start_download(DownloadKind::Single);
            vec![Effect::DownloadSingle {
                pdf_url: pdf_url.to_string(),
                title,
            }]
        }
        Msg::DownloadAllClicked => {
            if state.download_in_flight() || state.selector().is_none() {
                return (state, Vec::new());
            }
            // An empty page is still sent; the remote answers with an empty archive.
            let items = state
                .items()
                .iter()
                .map(|paper| BulkItem {
                    pdf_url: paper.pdf_url.clone(),
                    title: paper.title.clone(),
                })
                .collect();
            state.start_download(DownloadKind::Bulk);
            vec![Effect::DownloadBulk { items }]
        }
        Msg::DownloadFinished { kind, outcome } => {
            state.finish_download(kind, outcome);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn change_selector(state: &mut PageState, selector: Selector) -> Vec<Effect> {
    // Re-selecting what is already on screen (or on its way) is not a change.
    let unchanged = state.selector() == Some(&selector)
        && state.skip() == 0
        && matches!(state.status(), PageStatus::Loading | PageStatus::Loaded);
    if unchanged {
        return Vec::new();
    }
    state.select(selector);
    state.start_fetch().into_iter().collect()
}

fn select_page(state: &mut PageState, skip: u32) -> Vec<Effect> {
    if !matches!(state.selector(), Some(Selector::Category(_))) || !state.is_valid_skip(skip) {
        return Vec::new();
    }
    let already_shown = skip == state.skip()
        && matches!(state.status(), PageStatus::Loading | PageStatus::Loaded);
    if already_shown {
        return Vec::new();
    }
    state.set_skip(skip);
    state.start_fetch().into_iter().collect()
}
