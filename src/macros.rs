/// File path of the document a text-document request is about, or `None`
/// for URIs that are not `file:` URIs.
#[macro_export]
macro_rules! params_path {
    ($params:expr) => {
        $params.text_document.uri.to_file_path().ok()
    };
}
