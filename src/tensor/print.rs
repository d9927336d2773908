use crate::tensor::Tensor;
use ndarray::{ArrayD, IxDyn};
use std::fmt;

/// 高阶张量只展示前若干个元素
const PREVIEW_LEN: usize = 8;

impl Tensor {
    pub fn print(&self) {
        println!("{self}");
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn display_recursive(
            f: &mut fmt::Formatter,
            data: &ArrayD<f32>,
            indices: &mut Vec<usize>,
            depth: usize,
            rank: usize,
        ) -> fmt::Result {
            if depth == rank {
                write!(f, "{:8.4}", data[IxDyn(&indices[..])])?;
            } else {
                write!(f, "[")?;
                for i in 0..data.shape()[depth] {
                    indices[depth] = i;
                    display_recursive(f, data, indices, depth + 1, rank)?;

                    if i != data.shape()[depth] - 1 {
                        write!(f, ", ")?;
                        if depth == 0 {
                            write!(f, "\n ")?;
                        }
                    }
                }
                write!(f, "]")?;
            }
            Ok(())
        }

        let shape = self.shape();
        let rank = shape.len();
        if rank > 2 {
            // 池化类张量动辄数十万元素，只给出形状与开头若干个值
            let preview = self
                .data_as_slice()
                .iter()
                .take(PREVIEW_LEN)
                .map(|x| format!("{x:.4}"))
                .collect::<Vec<_>>()
                .join(", ");
            let ellipsis = if self.size() > PREVIEW_LEN { ", ..." } else { "" };
            writeln!(f, "<形状：{shape:?}，共{}个元素> [{preview}{ellipsis}]", self.size())
        } else {
            let mut indices = vec![0; rank];
            display_recursive(f, self.as_array(), &mut indices, 0, rank)?;
            writeln!(f, "\n形状: {shape:?}")
        }
    }
}
