//! 客户端的过滤和分页
//!
//! 数据量很小，全部取回后在内存中处理

use serde::Serialize;

/// 列表页的查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: usize,
    pub per_page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            page: 1,
            per_page: 20,
        }
    }
}

impl ListQuery {
    /// 先过滤再分页
    pub fn apply<T, F>(&self, items: Vec<T>, key: F) -> PageSlice<T>
    where
        F: Fn(&T) -> String,
    {
        let filtered = filter_text(items, self.search.as_deref(), key);
        paginate(filtered, self.page, self.per_page)
    }
}

/// 一页数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    /// 从 1 开始
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// 按关键字过滤（不区分大小写的子串匹配），空关键字返回全部
pub fn filter_text<T, F>(items: Vec<T>, search: Option<&str>, key: F) -> Vec<T>
where
    F: Fn(&T) -> String,
{
    let needle = match search.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => return items,
    };
    items
        .into_iter()
        .filter(|item| key(item).to_lowercase().contains(&needle))
        .collect()
}

/// 分页；页码越界时返回空页，但总数仍然正确
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> PageSlice<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    PageSlice {
        items,
        page,
        total_pages,
        total_items,
    }
}
