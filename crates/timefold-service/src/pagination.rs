use timefold_core::error::TimefoldError;

use crate::config::Settings;

/// Validated 1-indexed pagination parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageParams {
    pub page: usize,
    pub page_size: usize,
}

impl PageParams {
    /// Validate raw query values against the configured bounds. `None`
    /// falls back to page 1 / the default page size.
    pub fn resolve(
        page: Option<usize>,
        page_size: Option<usize>,
        settings: &Settings,
    ) -> Result<Self, TimefoldError> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(TimefoldError::invalid_input("Page must be at least 1"));
        }

        let page_size = page_size.unwrap_or(settings.default_page_size);
        if page_size < settings.min_page_size || page_size > settings.max_page_size {
            return Err(TimefoldError::invalid_input(format!(
                "Page size must be between {} and {}",
                settings.min_page_size, settings.max_page_size
            )));
        }

        Ok(Self { page, page_size })
    }

    /// Rows to skip for this page.
    pub fn skip(&self) -> usize {
        (self.page - 1) * self.page_size
    }
}

/// One page of results plus the unpaginated total.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}
