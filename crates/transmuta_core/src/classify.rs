/// Coarse classification of an input file. Decides which conversion strategy
/// runs and which output formats are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Image,
    Ebook,
    Unknown,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif", "svg"];
const EBOOK_EXTENSIONS: &[&str] = &["epub", "mobi", "azw3", "pdf", "txt"];

/// Lowercase suffix after the final `.`, or empty when there is none.
/// A dot in the first position does not count as an extension separator.
pub fn file_extension(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename[idx + 1..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Maps a filename plus its declared media type to a category.
///
/// The extension table wins; the declared type is only consulted for files
/// with an unrecognized extension. Pure, and computed exactly once per item
/// at submission time.
pub fn classify(filename: &str, declared_media_type: &str) -> Category {
    let ext = file_extension(filename);
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Category::Image;
    }
    if EBOOK_EXTENSIONS.contains(&ext.as_str()) {
        return Category::Ebook;
    }

    if declared_media_type.starts_with("image/") {
        return Category::Image;
    }
    if declared_media_type.contains("pdf")
        || declared_media_type.contains("epub")
        || filename.ends_with(".mobi")
    {
        return Category::Ebook;
    }

    Category::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_extension_ignores_declared_type() {
        assert_eq!(classify("photo.PNG", "application/pdf"), Category::Image);
        assert_eq!(classify("book.epub", "image/png"), Category::Ebook);
        assert_eq!(classify("scan.tar.pdf", ""), Category::Ebook);
    }

    #[test]
    fn falls_back_to_declared_media_type() {
        assert_eq!(classify("upload", "image/x-exotic"), Category::Image);
        assert_eq!(classify("paper.bin", "application/pdf"), Category::Ebook);
        assert_eq!(classify("book.dat", "application/epub+zip"), Category::Ebook);
        assert_eq!(classify("mystery", "application/octet-stream"), Category::Unknown);
    }

    #[test]
    fn extension_extraction_edge_cases() {
        assert_eq!(file_extension("a.PNG"), "png");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("no-extension"), "");
        // Leading dot is a hidden-file marker, not an extension separator.
        assert_eq!(file_extension(".png"), "");
        assert_eq!(file_extension("name."), "");
    }
}
