//! Match results - what a detector hands back when it recognises a buffer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An identified file format: short lowercase extension plus MIME type.
///
/// The extension may be empty (ELF binaries have no conventional one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FileKind {
    pub extension: &'static str,
    pub mime: &'static str,
}

impl FileKind {
    pub const fn new(extension: &'static str, mime: &'static str) -> Self {
        Self { extension, mime }
    }

    /// `(extension, mime)` pair
    pub fn pair(self) -> (&'static str, &'static str) {
        (self.extension, self.mime)
    }

    /// Coarse category used for grouping in reports
    pub fn category(&self) -> Category {
        Category::from_kind(self)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extension.is_empty() {
            write!(f, "{}", self.mime)
        } else {
            write!(f, "{} ({})", self.extension, self.mime)
        }
    }
}

/// File type categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Font,
    Executable,
    Model,
    Other,
}

impl Category {
    /// Determine the category of a detected kind.
    ///
    /// The top-level MIME type decides where it is unambiguous; `application/*`
    /// falls back to the extension.
    pub fn from_kind(kind: &FileKind) -> Self {
        match kind.mime.split('/').next().unwrap_or_default() {
            "image" => return Category::Image,
            "video" => return Category::Video,
            "audio" => return Category::Audio,
            "font" => return Category::Font,
            "model" => return Category::Model,
            "text" => return Category::Document,
            _ => {}
        }

        match kind.extension {
            "pdf" | "epub" | "odt" | "ods" | "odp" | "docx" | "xlsx" | "pptx" | "rtf" | "xml"
            | "ps" | "eps" | "ai" | "chm" | "mobi" | "cfb" | "indd" | "skp" | "blend" => {
                Category::Document
            }

            "zip" | "tar" | "gz" | "7z" | "rar" | "bz2" | "xz" | "lz" | "lzh" | "zst" | "cab"
            | "Z" | "ar" | "deb" | "rpm" | "dmg" | "asar" | "xpi" | "crx" => Category::Archive,

            "" | "exe" | "wasm" | "nes" => Category::Executable,

            "asf" | "mxf" | "ogx" => Category::Video,

            "eot" => Category::Font,

            _ => Category::Other,
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> colored::Color {
        use colored::Color;
        match self {
            Category::Image => Color::Magenta,
            Category::Video => Color::Cyan,
            Category::Audio => Color::Yellow,
            Category::Document => Color::Green,
            Category::Archive => Color::Blue,
            Category::Font => Color::BrightWhite,
            Category::Executable => Color::BrightRed,
            Category::Model => Color::BrightBlue,
            Category::Other => Color::White,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Document => "document",
            Category::Archive => "archive",
            Category::Font => "font",
            Category::Executable => "executable",
            Category::Model => "model",
            Category::Other => "other",
        };
        f.write_str(name)
    }
}
