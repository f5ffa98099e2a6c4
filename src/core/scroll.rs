use crate::domain::model::Bounds;

/// 依 helper 與容器的位置計算新的捲動位移，讓拖曳中的 helper 保持可見。
///
/// helper 放在捲動內容裡，向左捲動後 helper 會跟著右移，
/// 所以右側溢出要用修正後的位置再判斷一次。
/// 回傳值一定落在 `[0, max(0, content_width - container.width)]`。
pub fn compute_scroll(container: Bounds, helper: Bounds, current_offset: f64, content_width: f64) -> f64 {
    let max_offset = (content_width - container.width).max(0.0);
    let mut offset = current_offset;
    let mut helper = helper;

    if helper.left < container.left {
        let new_offset = (offset - (container.left - helper.left)).max(0.0);
        helper = helper.shifted(offset - new_offset);
        offset = new_offset;
    }

    if helper.right() > container.right() {
        offset = (offset + (helper.right() - container.right())).min(max_offset);
    }

    offset.clamp(0.0, max_offset)
}
