// src/views/mod.rs
//! Local state of the list and form views, independent of any rendering

pub mod applications;
pub mod job_list;
pub mod wizard;

pub use applications::ApplicationListState;
pub use job_list::JobListState;
pub use wizard::{JobWizard, WizardError, WizardStep};

/// One page of a list paginated on the client.
#[derive(Debug, PartialEq)]
pub struct Paged<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
}

/// Slice `items` into pages of `per_page`. Pages are 1-based and clamped
/// into range; an empty list has a single empty page.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Paged<'_, T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) * per_page).min(items.len());
    let end = (start + per_page).min(items.len());

    Paged {
        items: &items[start..end],
        page,
        total_pages,
    }
}
