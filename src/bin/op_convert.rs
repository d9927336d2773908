/*
 * @Date         : 2026-10-17
 * @Description  : 参考转换工具
 *
 * 用法：op_convert <graph.json> inputshape=[1,12,128,127]
 * 在图文件所在目录生成 <stem>_converted.json 与 <stem>_converted.npy；成功退出码 0，否则 1
 */

use log::{error, info, warn};
use std::path::PathBuf;

use op_parity::conversion::lowering::{convert_graph_file, parse_input_shape};
use op_parity::errors::ParityError;
use op_parity::harness::logger;

fn parse_args(args: &[String]) -> Result<(PathBuf, Vec<usize>), ParityError> {
    let mut graph = None;
    let mut shape = None;
    for arg in args {
        if arg.starts_with("inputshape=") {
            shape = Some(parse_input_shape(arg)?);
        } else if arg.contains('=') {
            warn!("忽略未知参数`{arg}`");
        } else if graph.is_none() {
            graph = Some(PathBuf::from(arg));
        } else {
            return Err(ParityError::Conversion(format!("多余的参数`{arg}`")));
        }
    }
    let graph = graph.ok_or_else(|| ParityError::Conversion("缺少图文件参数".to_string()))?;
    let shape =
        shape.ok_or_else(|| ParityError::Conversion("缺少 inputshape=[...] 参数".to_string()))?;
    Ok((graph, shape))
}

fn main() {
    if let Err(e) = logger::init_log("info") {
        eprintln!("{e}");
    }
    let args: Vec<String> = std::env::args().skip(1).collect();

    let result = parse_args(&args)
        .and_then(|(graph, shape)| convert_graph_file(&graph, &shape));
    match result {
        Ok((module_path, param_path)) => {
            info!(
                "已生成 {} 与 {}",
                module_path.display(),
                param_path.display()
            );
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
