/// One entry of the pagination strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// 1-based inclusive range, e.g. `"51-100"`.
    pub label: String,
    pub skip: u32,
    pub is_active: bool,
}

/// Builds the pagination strip for a listing of `total_entries` items.
///
/// Pure and cheap enough to run on every render. Zero entries (or a zero page
/// size) yields no pages.
pub fn compute(total_entries: u32, page_size: u32, current_skip: u32) -> Vec<PageLink> {
    if total_entries == 0 || page_size == 0 {
        return Vec::new();
    }

    let page_count = total_entries.div_ceil(page_size);
    (0..page_count)
        .map(|page| {
            // page < page_count, so skip < total_entries and cannot overflow.
            let skip = page * page_size;
            let end = skip.saturating_add(page_size).min(total_entries);
            PageLink {
                label: format!("{}-{}", skip + 1, end),
                skip,
                is_active: skip == current_skip,
            }
        })
        .collect()
}
