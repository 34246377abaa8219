use crate::cli::report::report_failure;
use anyhow::Context;
use tunegrab_core::extractor::ExtractError;

fn render(err: &anyhow::Error) -> String {
    let mut buf = Vec::new();
    report_failure(err, &mut buf);
    String::from_utf8(buf).unwrap()
}

#[test]
fn extract_error_is_a_single_line() {
    let err: anyhow::Error = ExtractError::new("[youtube] abc: Video unavailable").into();
    assert_eq!(render(&err), "ERROR:[youtube] abc: Video unavailable\n");
}

#[test]
fn unexpected_error_has_trace_then_error_line() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = Err::<(), _>(io)
        .context("failed to rename /tmp/a.mp3 to /tmp/b.mp3")
        .unwrap_err();
    let text = render(&err);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.len() > 1, "{text}");
    assert!(text.contains("Caused by"));
    assert_eq!(
        *lines.last().unwrap(),
        "ERROR:failed to rename /tmp/a.mp3 to /tmp/b.mp3: denied"
    );
}
