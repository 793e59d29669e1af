//! Pagination utilities for service layer
//!
//! `PageRequest` is 0-based like the public API. `Page<T>` carries one page of
//! items with enough metadata for clients to walk the rest.

use std::str::FromStr;

use sea_orm::{EntityTrait, Order, QueryOrder, Select};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for Order {
    fn from(d: Direction) -> Self {
        match d { Direction::Asc => Order::Asc, Direction::Desc => Order::Desc }
    }
}

/// Sort order in the `property[,asc|desc]` form used by `?sort=`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(property: &str) -> Self { Self { property: property.to_string(), direction: Direction::Asc } }
    pub fn desc(property: &str) -> Self { Self { property: property.to_string(), direction: Direction::Desc } }
}

impl FromStr for Sort {
    type Err = ServiceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(',').map(str::trim);
        let property = parts.next().unwrap_or_default();
        if property.is_empty() {
            return Err(ServiceError::Validation("sort property required".into()));
        }
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("asc") => Direction::Asc,
            Some("desc") => Direction::Desc,
            Some(other) => return Err(ServiceError::Validation(format!("invalid sort direction '{other}'"))),
        };
        if parts.next().is_some() {
            return Err(ServiceError::Validation(format!("invalid sort '{raw}'")));
        }
        Ok(Self { property: property.to_string(), direction })
    }
}

/// Page request parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based page index
    pub page: u64,
    /// items per page
    pub size: u64,
    pub sort: Option<Sort>,
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Self { Self { page, size, sort: None } }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Clamp the page size to `1..=100`; returns `(page_index, page_size)`.
    ///
    /// The row offset `page * size` must fit a signed 64-bit SQL offset.
    pub fn normalize(&self) -> Result<(u64, u64), ServiceError> {
        let size = self.size.clamp(1, MAX_PAGE_SIZE);
        self.page
            .checked_mul(size)
            .filter(|offset| *offset <= i64::MAX as u64)
            .ok_or_else(|| ServiceError::Validation(format!("page index {} out of range", self.page)))?;
        Ok((self.page, size))
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self { page: 0, size: DEFAULT_PAGE_SIZE, sort: None } }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
    pub size: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, number: u64, size: u64) -> Self {
        let total_pages = if size == 0 { 0 } else { total_elements.div_ceil(size) };
        Self { content, total_elements, total_pages, number, size }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
        }
    }

    pub fn is_last(&self) -> bool { self.number + 1 >= self.total_pages }
}

/// Apply the requested sort to `select`, always ending with `tiebreak`
/// ascending so pages stay stable. Unknown properties are rejected.
pub fn ordered<E, F>(select: Select<E>, sort: Option<&Sort>, resolve: F, tiebreak: E::Column) -> Result<Select<E>, ServiceError>
where
    E: EntityTrait,
    F: Fn(&str) -> Option<E::Column>,
{
    let select = match sort {
        Some(s) => {
            let col = resolve(&s.property)
                .ok_or_else(|| ServiceError::Validation(format!("cannot sort by '{}'", s.property)))?;
            select.order_by(col, s.direction.into())
        }
        None => select,
    };
    Ok(select.order_by_asc(tiebreak))
}
