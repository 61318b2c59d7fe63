use crate::models::{Purpose, Return};

/// 退回的用途列表中存在与元素用途完全相同的三元组
pub fn purpose_covers(element_purpose: &Purpose, return_purposes: &[Purpose]) -> bool {
    return_purposes.iter().any(|p| p == element_purpose)
}

/// 退回是否覆盖该用途
pub fn return_covers(ret: &Return, element_purpose: &Purpose) -> bool {
    purpose_covers(element_purpose, &ret.purposes)
}
