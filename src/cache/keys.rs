/// 配额记录缓存键前缀
const QUOTA_PREFIX: &str = "quota:";

/// 生成客户端配额缓存键
pub fn quota_key(client_id: &str) -> String {
    format!("{}{}", QUOTA_PREFIX, client_id)
}
