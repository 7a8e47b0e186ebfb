use std::marker::PhantomData;

use prettytable::{format, row, Row, Table};

use crate::models::StoreRoute;

pub trait ToRow {
    fn columns() -> Row;
    fn to_row(&self) -> Row;
}

pub struct OutputTable<T: ToRow> {
    inner: Table,
    row_type: PhantomData<T>,
}

impl<T> OutputTable<T>
where
    T: ToRow,
{
    pub fn new() -> Self {
        let format = format::FormatBuilder::new()
            .padding(1, 1)
            .separator(
                format::LinePosition::Title,
                format::LineSeparator::new('-', '+', '+', '+'),
            )
            .build();
        let mut table = Table::new();
        table.set_format(format);
        table.set_titles(T::columns());
        Self {
            inner: table,
            row_type: PhantomData,
        }
    }

    pub fn add_row(&mut self, row: &T) {
        self.inner.add_row(row.to_row());
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn print(&self) {
        self.inner.printstd();
    }

    #[cfg(test)]
    pub fn render(&self) -> String {
        self.inner.to_string()
    }
}

impl ToRow for StoreRoute {
    fn columns() -> Row {
        row!["Destination", "Gateways"]
    }

    fn to_row(&self) -> Row {
        let gateways: Vec<String> = self.gateways.iter().map(|g| g.to_string()).collect();
        row![self.stored_as, gateways.join(", ")]
    }
}
