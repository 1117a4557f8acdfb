use super::Mapper;
use crate::core::{ColumnDescriptor, Result};
use crate::result::RowSource;
use std::marker::PhantomData;

/// A [`Mapper`] backed by a closure.
pub struct FnMapper<T, F> {
    map: F,
    marker: PhantomData<fn() -> T>,
}

impl<T, F> FnMapper<T, F>
where
    F: Fn(&dyn RowSource, &ColumnDescriptor) -> Result<T> + Send + Sync,
{
    pub fn new(map: F) -> Self {
        Self {
            map,
            marker: PhantomData,
        }
    }
}

pub fn from_fn<T, F>(map: F) -> FnMapper<T, F>
where
    F: Fn(&dyn RowSource, &ColumnDescriptor) -> Result<T> + Send + Sync,
{
    FnMapper::new(map)
}

impl<T, F> Mapper<T> for FnMapper<T, F>
where
    F: Fn(&dyn RowSource, &ColumnDescriptor) -> Result<T> + Send + Sync,
{
    fn map(&self, row: &dyn RowSource, columns: &ColumnDescriptor) -> Result<T> {
        (self.map)(row, columns)
    }
}
