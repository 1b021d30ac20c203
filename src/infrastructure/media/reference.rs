use serde::{Deserialize, Serialize};

use super::store::MediaKind;

/// Identifier and kind derived from a stored media URL; everything the
/// provider needs to delete or re-fetch the object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub public_id: String,
    pub kind: MediaKind,
}

/// Per-page rendering of a stored document: a large preview plus a small
/// thumbnail, both synthesized by URL transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePreview {
    pub page: u32,
    pub url: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ThumbnailOptions {
    pub width: u32,
    pub height: u32,
    pub page: u32,
    pub quality: &'static str,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        ThumbnailOptions {
            width: 800,
            height: 1000,
            page: 1,
            quality: "auto",
        }
    }
}

/// Derives the provider identifier and resource kind from a stored URL.
///
/// The delivery-type marker in the URL path (`/raw/upload/` vs
/// `/image/upload/`) takes precedence; URLs without one fall back to
/// file-extension sniffing. Returns `None` for unrecognized shapes —
/// callers treat that as "nothing to delete" and proceed.
pub fn resolve_reference(url: &str) -> Option<MediaReference> {
    let parsed = url::Url::parse(url).ok()?;
    let path = parsed.path();

    if let Some((prefix, rest)) = path.split_once("/upload/") {
        let kind = if prefix.ends_with("/raw") {
            MediaKind::Raw
        } else if prefix.ends_with("/image") {
            MediaKind::Image
        } else {
            sniff_kind(path)
        };

        let public_id = strip_version(rest);
        let public_id = strip_extension(public_id);
        if public_id.is_empty() {
            return None;
        }

        return Some(MediaReference {
            public_id: public_id.to_string(),
            kind,
        });
    }

    // No delivery marker: identifier is the bare filename without extension.
    let file_name = path.rsplit('/').next().filter(|s| !s.is_empty())?;
    let public_id = strip_extension(file_name);
    if public_id.is_empty() {
        return None;
    }

    Some(MediaReference {
        public_id: public_id.to_string(),
        kind: sniff_kind(path),
    })
}

pub fn is_pdf_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.ends_with(".pdf") || lower.contains(".pdf?")
}

/// Synthesizes a bitmap thumbnail URL for one page of a stored document
/// by inserting a transformation expression after the upload segment.
/// URLs without an upload segment pass through unchanged.
pub fn pdf_thumbnail_url(url: &str, opts: ThumbnailOptions) -> String {
    let Some((base, path)) = url.split_once("/upload/") else {
        return url.to_string();
    };
    let transformation = format!(
        "w_{},h_{},c_fill,q_{},pg_{}",
        opts.width, opts.height, opts.quality, opts.page
    );
    format!("{}/upload/{}/{}", base, transformation, path)
}

/// One preview/thumbnail pair per page, 1-indexed. The page total comes
/// from the provider's metadata and is trusted as-is.
pub fn pdf_preview_pairs(url: &str, total_pages: u32) -> Vec<PagePreview> {
    (1..=total_pages)
        .map(|page| PagePreview {
            page,
            url: pdf_thumbnail_url(
                url,
                ThumbnailOptions {
                    page,
                    width: 1200,
                    ..Default::default()
                },
            ),
            thumbnail: pdf_thumbnail_url(
                url,
                ThumbnailOptions {
                    page,
                    width: 400,
                    ..Default::default()
                },
            ),
        })
        .collect()
}

fn sniff_kind(path: &str) -> MediaKind {
    if path.to_lowercase().ends_with(".pdf") {
        MediaKind::Raw
    } else {
        MediaKind::Image
    }
}

fn strip_version(rest: &str) -> &str {
    match rest.split_once('/') {
        Some((first, remainder))
            if first.len() > 1
                && first.starts_with('v')
                && first[1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            remainder
        }
        _ => rest,
    }
}

fn strip_extension(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE_URL: &str =
        "https://res.cloudinary.com/demo/image/upload/v1712345/portfolio-projects/sunset.jpg";
    const PDF_URL: &str =
        "https://res.cloudinary.com/demo/raw/upload/v1712345/portfolio-certifications/aws.pdf";

    #[test]
    fn marker_takes_precedence_over_extension() {
        let r = resolve_reference(PDF_URL).unwrap();
        assert_eq!(r.kind, MediaKind::Raw);
        assert_eq!(r.public_id, "portfolio-certifications/aws");

        // An image-delivered object keeps Image kind even with odd naming.
        let r = resolve_reference(
            "https://res.cloudinary.com/demo/image/upload/v1/portfolio-projects/scan.pdf",
        )
        .unwrap();
        assert_eq!(r.kind, MediaKind::Image);
    }

    #[test]
    fn image_reference_resolves_folder_qualified_id() {
        let r = resolve_reference(IMAGE_URL).unwrap();
        assert_eq!(r.kind, MediaKind::Image);
        assert_eq!(r.public_id, "portfolio-projects/sunset");
    }

    #[test]
    fn fallback_extension_sniffing_without_marker() {
        let r = resolve_reference("https://cdn.example.com/files/cert.pdf").unwrap();
        assert_eq!(r.kind, MediaKind::Raw);
        assert_eq!(r.public_id, "cert");

        let r = resolve_reference("https://cdn.example.com/files/photo.png").unwrap();
        assert_eq!(r.kind, MediaKind::Image);
        assert_eq!(r.public_id, "photo");
    }

    #[test]
    fn unrecognized_shapes_yield_none() {
        assert_eq!(resolve_reference("not a url"), None);
        assert_eq!(resolve_reference("https://cdn.example.com/"), None);
    }

    #[test]
    fn thumbnail_url_inserts_transformation() {
        let out = pdf_thumbnail_url(PDF_URL, ThumbnailOptions::default());
        assert_eq!(
            out,
            "https://res.cloudinary.com/demo/raw/upload/w_800,h_1000,c_fill,q_auto,pg_1/v1712345/portfolio-certifications/aws.pdf"
        );
    }

    #[test]
    fn thumbnail_url_passes_through_without_upload_segment() {
        let out = pdf_thumbnail_url("https://cdn.example.com/cert.pdf", ThumbnailOptions::default());
        assert_eq!(out, "https://cdn.example.com/cert.pdf");
    }

    #[test]
    fn preview_pairs_are_one_indexed_per_page() {
        let pairs = pdf_preview_pairs(PDF_URL, 3);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].page, 1);
        assert_eq!(pairs[2].page, 3);
        assert!(pairs[0].url.contains("w_1200"));
        assert!(pairs[0].url.contains("pg_1"));
        assert!(pairs[1].thumbnail.contains("w_400"));
        assert!(pairs[1].thumbnail.contains("pg_2"));
    }

    #[test]
    fn pdf_detection() {
        assert!(is_pdf_url(PDF_URL));
        assert!(is_pdf_url("https://x/y/cert.PDF"));
        assert!(is_pdf_url("https://x/y/cert.pdf?sig=1"));
        assert!(!is_pdf_url(IMAGE_URL));
    }
}
