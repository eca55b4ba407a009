// 領域層：核心模型與埠介面，不做任何 I/O

pub mod envelope;
pub mod model;
pub mod ports;
