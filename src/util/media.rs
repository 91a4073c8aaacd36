use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::io;
use std::path::Path;

pub(crate) fn infer_media_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",

        _ => "application/octet-stream",
    }
}

pub(crate) fn to_data_uri(path: &Path, data: &[u8]) -> String {
    format!("data:{};base64,{}", infer_media_type(path), STANDARD.encode(data))
}

/// Reads the file at `path` and inlines it as a `data:` URI.
pub(crate) async fn read_data_uri(path: &Path) -> io::Result<String> {
    let data = tokio::fs::read(path).await?;
    Ok(to_data_uri(path, &data))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    #[test]
    fn test_infer_media_type() {
        #[rustfmt::skip]
        let expected = [
            ("image/jpeg", "images/cover.JPG"),
            ("image/png", "a/b/fig1.png"),
            ("image/svg+xml", "map.svg"),
            ("audio/mpeg", "aud_001.mp3"),
            ("application/octet-stream", "README"),
        ];

        for (expected, path) in expected {
            assert_eq!(expected, super::infer_media_type(Path::new(path)));
        }
    }

    #[test]
    fn test_to_data_uri() {
        assert_eq!(
            "data:image/gif;base64,R0lGODlh",
            super::to_data_uri(Path::new("dot.gif"), b"GIF89a"),
        );
    }
}
