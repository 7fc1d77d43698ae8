#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    pub maybe_limit: Option<u64>,
    pub maybe_offset: Option<u64>,
}

impl Paginator {
    pub const DEFAULT_PER_PAGE: u64 = 20;

    pub fn limit(&mut self, limit: u64) {
        self.maybe_limit = Some(limit);
    }

    pub fn offset(&mut self, offset: u64) {
        self.maybe_offset = Some(offset);
    }

    /// Pages start at 1, anything lower is page 1; the first page sets no offset.
    pub fn page(&mut self, page: i64, per_page: u64) {
        let page = page.max(1) as u64;
        self.limit(per_page);
        if page > 1 {
            self.offset((page - 1).saturating_mul(per_page));
        }
    }
}
