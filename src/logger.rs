/// Инициализирует глобальный журнал с заданным уровнем.
///
/// Настраивает журнал с помощью `tracing_subscriber::fmt`, который будет:
/// - отображать только сообщения с уровнем не ниже указанного `level`
/// - включать информацию о файле и номере строки
/// - исключать отображение цели (target)
///
/// Повторная инициализация игнорируется с предупреждением, поэтому функцию
/// можно безопасно вызывать из тестов.
pub fn init(level: tracing::Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("global logger is already initialized");
        return;
    }
    tracing::info!("logger initialized with level: '{level}'");
}

/// Выбирает уровень журнала по окружению: `INFO` в продакшене
/// (задана переменная `FOODBOT_PRODUCTION`), иначе `DEBUG`.
pub fn level_from_env() -> tracing::Level {
    if std::env::var("FOODBOT_PRODUCTION").is_ok() {
        tracing::Level::INFO
    } else {
        tracing::Level::DEBUG
    }
}
