#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_bind as bind;
pub use vc_reflect as reflect;
pub use vc_utils as utils;
