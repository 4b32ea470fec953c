use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};
use rand::Rng;

use crate::AttachmentError;

/// Form field the tracker reads uploaded files from.
pub const FILE_FIELD: &str = "file";

/// RFC 2046 caps boundaries at 70 characters.
const MAX_BOUNDARY_LEN: usize = 70;

/// A complete, in-memory `multipart/form-data` body holding one file part.
#[derive(Debug, Clone)]
pub struct MultipartPayload {
    boundary: String,
    body: Bytes,
}

impl MultipartPayload {
    /// Read `path` and wrap its exact bytes in a part named `file`, using the
    /// path's base name as the filename.
    pub async fn from_file(path: &Path) -> Result<Self, AttachmentError> {
        let name = path.file_name().ok_or_else(|| {
            AttachmentError::Encoding(format!("{} has no file name", path.display()))
        })?;
        // The tracker stores the name as text; never send a lossy stand-in.
        let filename = name.to_str().ok_or_else(|| {
            AttachmentError::Encoding(format!("file name {name:?} is not valid UTF-8"))
        })?;
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| AttachmentError::from_file_io(path, e))?;
        Self::with_boundary(filename, &content, random_boundary())
    }

    /// Build a payload with a caller-chosen boundary.
    pub fn with_boundary(
        filename: &str,
        content: &[u8],
        boundary: String,
    ) -> Result<Self, AttachmentError> {
        validate_boundary(&boundary)?;
        if filename.contains(['\r', '\n']) {
            return Err(AttachmentError::Encoding(format!(
                "file name {filename:?} contains a line break"
            )));
        }

        let mut body = BytesMut::with_capacity(content.len() + 256);
        body.put_slice(format!("--{boundary}\r\n").as_bytes());
        body.put_slice(
            format!(
                "Content-Disposition: form-data; name=\"{FILE_FIELD}\"; filename=\"{}\"\r\n",
                escape_quotes(filename)
            )
            .as_bytes(),
        );
        body.put_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.put_slice(content);
        body.put_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Ok(Self {
            boundary,
            body: body.freeze(),
        })
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// 30 random bytes, hex encoded.
fn random_boundary() -> String {
    let mut rng = rand::thread_rng();
    (0..30)
        .map(|_| format!("{:02x}", rng.gen::<u8>()))
        .collect()
}

fn validate_boundary(boundary: &str) -> Result<(), AttachmentError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || "'()+_,-./:=? ".contains(c);
    if boundary.is_empty()
        || boundary.len() > MAX_BOUNDARY_LEN
        || boundary.ends_with(' ')
        || !boundary.chars().all(allowed)
    {
        return Err(AttachmentError::Encoding(format!(
            "invalid boundary {boundary:?}"
        )));
    }
    Ok(())
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_of_single_file_part() {
        let payload = MultipartPayload::with_boundary("test.txt", b"test content", "XyZ".into())
            .unwrap();
        assert_eq!(payload.content_type(), "multipart/form-data; boundary=XyZ");
        assert_eq!(
            &payload.body()[..],
            b"--XyZ\r\n\
              Content-Disposition: form-data; name=\"file\"; filename=\"test.txt\"\r\n\
              Content-Type: application/octet-stream\r\n\
              \r\n\
              test content\r\n\
              --XyZ--\r\n"
        );
    }

    #[test]
    fn random_boundaries_are_valid_and_distinct() {
        let a = random_boundary();
        let b = random_boundary();
        assert_eq!(a.len(), 60);
        assert!(validate_boundary(&a).is_ok());
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_bad_boundaries() {
        for bad in ["", "ends with space ", "semi;colon", &"x".repeat(71)] {
            assert!(
                matches!(
                    MultipartPayload::with_boundary("f", b"", bad.to_string()),
                    Err(AttachmentError::Encoding(_))
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn escapes_quotes_in_filename() {
        let payload = MultipartPayload::with_boundary(r#"say "hi".txt"#, b"", "b".into())
            .unwrap();
        let text = String::from_utf8(payload.body().to_vec()).unwrap();
        assert!(text.contains(r#"filename="say \"hi\".txt""#));
    }

    #[test]
    fn rejects_line_breaks_in_filename() {
        assert!(matches!(
            MultipartPayload::with_boundary("a\r\nb", b"", "b".into()),
            Err(AttachmentError::Encoding(_))
        ));
    }

    #[tokio::test]
    async fn from_file_uses_base_name_and_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.bin");
        let content: Vec<u8> = (0..=255).collect();
        std::fs::write(&path, &content).unwrap();

        let payload = MultipartPayload::from_file(&path).await.unwrap();
        let body = payload.body();
        let header = b"filename=\"report.bin\"";
        assert!(body.windows(header.len()).any(|w| w == header));
        let has_content = body.windows(content.len()).any(|w| w == content);
        assert!(has_content);
        assert!(!body.windows(11).any(|w| w == b"/report.bin"));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = MultipartPayload::from_file(Path::new("/nonexistent/file.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::FileNotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_file_name_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"report-\xff.txt"));
        std::fs::write(&path, "data").unwrap();

        let err = MultipartPayload::from_file(&path).await.unwrap_err();
        assert!(matches!(err, AttachmentError::Encoding(_)), "{err:?}");
    }

    #[tokio::test]
    async fn directory_is_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MultipartPayload::from_file(dir.path()).await.unwrap_err();
        assert!(matches!(err, AttachmentError::FileAccess { .. }));
    }
}
