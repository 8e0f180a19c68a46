/// Returned for any extension the table does not know.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Infers a MIME type from the suffix after the last `.` of the file name,
/// ignoring case. A bare `.png` counts as a PNG.
pub fn mime_type_for_path(path: &str) -> &'static str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let extension = match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return FALLBACK_MIME_TYPE,
    };
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "txt" => "text/plain",
        "html" => "text/html",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "zip" => "application/zip",
        _ => FALLBACK_MIME_TYPE,
    }
}

/// An explicit, non-empty override always wins over inference.
pub fn resolve_mime_type(explicit: Option<&str>, path: &str) -> String {
    match explicit {
        Some(mime) if !mime.trim().is_empty() => mime.to_string(),
        _ => mime_type_for_path(path).to_string(),
    }
}
