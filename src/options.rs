use super::catalog::FilingRecord;

/// Which filings of a catalog to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOptions {
    /// Wanted form types. Empty keeps every form.
    pub form_types: Vec<String>,
    /// Maximum number of filings. `None` keeps all of them.
    pub limit: Option<usize>,
    /// Whether amended forms (e.g. `10-K/A`) stay in the selection.
    /// Defaults to false.
    pub include_amendments: bool,
}

impl SelectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form_type(mut self, form_type: impl Into<String>) -> Self {
        self.form_types = vec![form_type.into()];
        self
    }

    pub fn with_form_types<I, S>(mut self, form_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.form_types = form_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set whether to keep amendment forms.
    ///
    /// Requesting "10-K" matches "10-K/A" rows as well; unless this is true
    /// those amendments are dropped again before the limit is applied.
    pub fn with_include_amendments(mut self, include_amendments: bool) -> Self {
        self.include_amendments = include_amendments;
        self
    }

    /// Applies form filter, amendment exclusion and limit, in that order.
    pub fn apply(&self, rows: impl IntoIterator<Item = FilingRecord>) -> Vec<FilingRecord> {
        let mut rows = filter_forms(rows, &self.form_types);
        if !self.include_amendments {
            rows = exclude_amendments(rows);
        }
        match self.limit {
            Some(limit) => take_limit(rows, limit),
            None => rows,
        }
    }

    /// Comma-separated form list, as recorded in manifest notes.
    pub(crate) fn forms_label(&self) -> String {
        self.form_types
            .iter()
            .map(|f| f.trim().to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Keeps rows whose form matches a wanted form, case-insensitively, either
/// exactly or once a trailing `/A` is removed. An empty list keeps everything.
pub fn filter_forms<S: AsRef<str>>(
    rows: impl IntoIterator<Item = FilingRecord>,
    wanted: &[S],
) -> Vec<FilingRecord> {
    let wanted: Vec<String> = wanted
        .iter()
        .map(|f| f.as_ref().trim().to_ascii_uppercase())
        .collect();

    rows.into_iter()
        .filter(|row| {
            if wanted.is_empty() {
                return true;
            }
            let form = row.form.trim().to_ascii_uppercase();
            let base = form.strip_suffix("/A").unwrap_or(&form);
            wanted.iter().any(|w| *w == form || w == base)
        })
        .collect()
}

/// Drops amended forms (those ending in `/A`).
pub fn exclude_amendments(rows: impl IntoIterator<Item = FilingRecord>) -> Vec<FilingRecord> {
    rows.into_iter().filter(|row| !row.is_amendment()).collect()
}

/// Keeps the first `n` rows.
pub fn take_limit(rows: impl IntoIterator<Item = FilingRecord>, n: usize) -> Vec<FilingRecord> {
    rows.into_iter().take(n).collect()
}
