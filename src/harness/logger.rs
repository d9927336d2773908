/*
 * @Date         : 2026-10-17
 * @Description  : log4rs 控制台日志初始化
 */

use log::LevelFilter;
use log4rs::{
    Config,
    append::console::{ConsoleAppender, Target},
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
};

use crate::errors::ParityError;

/// 初始化控制台日志（输出到 stderr，stdout 留给报告）。`level`如`info`、`debug`
pub fn init_log(level: &str) -> Result<(), ParityError> {
    let level: LevelFilter = level
        .parse()
        .map_err(|_| ParityError::Configuration(format!("无法识别的日志级别`{level}`")))?;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} [{h({l})} - {f}:{L}] {m}{n}",
        )))
        .build();
    let appender = Appender::builder().build("stderr", Box::new(stderr));

    let config = Config::builder()
        .appender(appender)
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| ParityError::Configuration(format!("日志配置非法: {e}")))?;
    log4rs::init_config(config)
        .map_err(|e| ParityError::Configuration(format!("日志初始化失败: {e}")))?;
    update_panic_hook();

    Ok(())
}

fn update_panic_hook() {
    let hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        log::error!("PANIC => {info}");
        hook(info);
    }));
}
