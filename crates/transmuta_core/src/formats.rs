use crate::classify::{file_extension, Category};

/// One selectable output format: stable id, human label, and the media type
/// stamped onto produced output. `transparent` marks formats whose encoding
/// carries an alpha channel; the raster strategy flattens onto white for the
/// others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOption {
    pub id: &'static str,
    pub label: &'static str,
    pub media_type: &'static str,
    pub transparent: bool,
}

pub const IMAGE_FORMATS: &[FormatOption] = &[
    FormatOption {
        id: "png",
        label: "PNG Image",
        media_type: "image/png",
        transparent: true,
    },
    FormatOption {
        id: "jpeg",
        label: "JPEG Image",
        media_type: "image/jpeg",
        transparent: false,
    },
    FormatOption {
        id: "webp",
        label: "WebP Image",
        media_type: "image/webp",
        transparent: true,
    },
    FormatOption {
        id: "bmp",
        label: "BMP Image",
        media_type: "image/bmp",
        transparent: false,
    },
];

pub const EBOOK_FORMATS: &[FormatOption] = &[
    FormatOption {
        id: "epub",
        label: "EPUB E-book",
        media_type: "application/epub+zip",
        transparent: false,
    },
    FormatOption {
        id: "mobi",
        label: "MOBI E-book",
        media_type: "application/x-mobipocket-ebook",
        transparent: false,
    },
    FormatOption {
        id: "pdf",
        label: "PDF Document",
        media_type: "application/pdf",
        transparent: false,
    },
    FormatOption {
        id: "txt",
        label: "TXT Text",
        media_type: "text/plain",
        transparent: false,
    },
    FormatOption {
        id: "azw3",
        label: "AZW3 Kindle",
        media_type: "application/vnd.amazon.ebook",
        transparent: false,
    },
];

/// Source extensions for which the pdf output is withheld: the e-reader
/// container formats carry no reliable text-layout metadata, so rendering
/// them to a fixed-page document is not offered.
const EREADER_SOURCES: &[&str] = &["epub", "mobi", "azw3"];

/// Ordered output formats valid for a file of `category` named `filename`.
/// Deterministic; empty for `Category::Unknown`.
pub fn available_formats(category: Category, filename: Option<&str>) -> Vec<&'static FormatOption> {
    match category {
        Category::Image => IMAGE_FORMATS.iter().collect(),
        Category::Ebook => {
            let Some(name) = filename else {
                return EBOOK_FORMATS.iter().collect();
            };
            let ext = file_extension(name);
            if EREADER_SOURCES.contains(&ext.as_str()) {
                EBOOK_FORMATS.iter().filter(|f| f.id != "pdf").collect()
            } else {
                EBOOK_FORMATS.iter().collect()
            }
        }
        Category::Unknown => Vec::new(),
    }
}

/// Fixed default target per category. Unknown files keep a txt default even
/// though their available set is empty; they only ever pass through.
pub fn default_target(category: Category) -> &'static str {
    match category {
        Category::Image => "png",
        Category::Ebook => "epub",
        Category::Unknown => "txt",
    }
}

/// Whether `format` is a valid target for a file of `category` named `filename`.
pub fn is_valid_target(category: Category, filename: &str, format: &str) -> bool {
    available_formats(category, Some(filename))
        .iter()
        .any(|f| f.id == format)
}

/// Looks up `id` in the image format table. `Some` means the raster strategy
/// can encode to it.
pub fn image_format(id: &str) -> Option<&'static FormatOption> {
    IMAGE_FORMATS.iter().find(|f| f.id == id)
}
