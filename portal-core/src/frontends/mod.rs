
// 默认：资源嵌入二进制
pub mod provider_embed;

// 本地开发：直接从磁盘读取，修改 UI 无需重新编译
#[cfg(feature = "frontend_disk")]
pub mod provider_disk;
