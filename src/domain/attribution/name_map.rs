//! Attribution Context - 人名到角色标识的查询表
//!
//! 由外部的选角环节产出，这里只是一个只读的双向查找。

use std::collections::HashMap;

use crate::domain::character::CharacterId;

/// 人名 → 角色标识映射
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    by_name: HashMap<String, CharacterId>,
    display: HashMap<CharacterId, String>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: CharacterId) {
        let name = name.into();
        self.display.insert(id.clone(), name.clone());
        self.by_name.insert(name, id);
    }

    /// 按人名解析角色标识
    pub fn resolve(&self, name: &str) -> Option<&CharacterId> {
        self.by_name.get(name)
    }

    /// 角色标识对应的展示名
    pub fn display_name(&self, id: &CharacterId) -> Option<&str> {
        self.display.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl FromIterator<(String, CharacterId)> for NameMap {
    fn from_iter<T: IntoIterator<Item = (String, CharacterId)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (name, id) in iter {
            map.insert(name, id);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bidirectional_lookup() {
        let mut map = NameMap::new();
        let id = CharacterId::from_name("萧炎");
        map.insert("萧炎", id.clone());

        assert_eq!(map.resolve("萧炎"), Some(&id));
        assert_eq!(map.display_name(&id), Some("萧炎"));
        assert!(map.resolve("药老").is_none());
    }
}
