use thiserror::Error;

/// Failures raised while decoding or encoding spreadsheet payloads.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{backend} backend error: {message}")]
    Backend { backend: String, message: String },

    #[error("unsupported {feature}: {context}")]
    Unsupported { feature: String, context: String },

    #[error("sheet `{sheet}` not found")]
    SheetNotFound { sheet: String },
}

impl IoError {
    pub fn from_backend<E: std::error::Error>(backend: &str, err: E) -> Self {
        IoError::Backend {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }
}

/// Convert a 1-based column number to its letter form (`1 -> A`, `27 -> AA`).
pub fn col_to_a1(mut col: u32) -> String {
    let mut out = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        out.push(b'A' + rem);
        col = (col - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::col_to_a1;

    #[test]
    fn column_letters() {
        assert_eq!(col_to_a1(1), "A");
        assert_eq!(col_to_a1(7), "G");
        assert_eq!(col_to_a1(26), "Z");
        assert_eq!(col_to_a1(27), "AA");
        assert_eq!(col_to_a1(703), "AAA");
    }
}
