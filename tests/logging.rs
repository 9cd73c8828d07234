use compatrun::cli::LogLevel;
use compatrun::logging::resolve_level;
use tracing::Level;

#[test]
fn cli_flag_wins_over_env() {
    assert_eq!(resolve_level(Some(LogLevel::Debug), Some("error")), Level::DEBUG);
    assert_eq!(resolve_level(Some(LogLevel::Trace), None), Level::TRACE);
}

#[test]
fn env_value_is_used_without_flag() {
    assert_eq!(resolve_level(None, Some("warn")), Level::WARN);
    assert_eq!(resolve_level(None, Some(" WARNING ")), Level::WARN);
    assert_eq!(resolve_level(None, Some("debug")), Level::DEBUG);
}

#[test]
fn unknown_or_missing_env_falls_back_to_info() {
    assert_eq!(resolve_level(None, Some("chatty")), Level::INFO);
    assert_eq!(resolve_level(None, None), Level::INFO);
}
