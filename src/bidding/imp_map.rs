// src/bidding/imp_map.rs

use std::collections::HashMap;

use crate::openrtb::request::{BidRequest, Imp};

/// imp.id -> imp 在 BidRequest.imp 中的下标
///
/// 每次调用构建一次，在合并参数与解析响应两个阶段之间显式传递。
/// 存下标而不是引用，这样合并阶段可以同时修改 site 与 imp。
#[derive(Debug, Default)]
pub struct ImpressionMap {
    index: HashMap<String, usize>,
}

impl ImpressionMap {
    pub fn build(request: &BidRequest) -> Self {
        let index = request
            .imp
            .iter()
            .enumerate()
            .map(|(idx, imp)| (imp.id.clone(), idx))
            .collect();
        Self { index }
    }

    pub fn contains(&self, imp_id: &str) -> bool {
        self.index.contains_key(imp_id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get<'r>(&self, request: &'r BidRequest, imp_id: &str) -> Option<&'r Imp> {
        let idx = *self.index.get(imp_id)?;
        request.imp.get(idx)
    }

    pub fn get_mut<'r>(&self, request: &'r mut BidRequest, imp_id: &str) -> Option<&'r mut Imp> {
        let idx = *self.index.get(imp_id)?;
        request.imp.get_mut(idx)
    }
}
