//! Fixed-schema measurement rows and the per-image table.

use std::fmt;
use std::io;

use crate::image::Label;

/// Column names in output order, without the optional secondary sphericity.
pub const BASE_COLUMNS: [&str; 8] = [
    "label",
    "surface_area",
    "volume",
    "convex_hull_area",
    "convex_hull_volume",
    "solidity",
    "sphericity_wadell",
    "sphericity_legland",
];

/// Name of the optional voxel-based sphericity column.
pub const SECONDARY_COLUMN: &str = "sphericity_diplib";

/// Measurements for one label.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementRow<L> {
    pub label: L,
    pub surface_area: f64,
    pub volume: f64,
    pub convex_hull_area: f64,
    pub convex_hull_volume: f64,
    pub solidity: f64,
    pub sphericity_wadell: f64,
    pub sphericity_legland: f64,
    /// Voxel-based P2A of the label's first connected component.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub sphericity_diplib: Option<f64>,
}

impl<L: Label> MeasurementRow<L> {
    /// Value of a numeric column by name. `label` is not numeric and
    /// returns `None`, as does an unknown or unset column.
    pub fn value(&self, column: &str) -> Option<f64> {
        match column {
            "surface_area" => Some(self.surface_area),
            "volume" => Some(self.volume),
            "convex_hull_area" => Some(self.convex_hull_area),
            "convex_hull_volume" => Some(self.convex_hull_volume),
            "solidity" => Some(self.solidity),
            "sphericity_wadell" => Some(self.sphericity_wadell),
            "sphericity_legland" => Some(self.sphericity_legland),
            SECONDARY_COLUMN => self.sphericity_diplib,
            _ => None,
        }
    }
}

/// Measurement rows in ascending label order.
///
/// ```
/// use shape_stats::{LabelImage, measure};
///
/// let image = LabelImage::from_fn([6, 6, 6], |x, y, z| {
///     u8::from((1..5).contains(&x) && (1..5).contains(&y) && (1..5).contains(&z))
/// });
/// let table = measure(&image, 0, false).unwrap();
///
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.column_names().len(), 8);
/// assert!(table.get(1).unwrap().solidity > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementTable<L> {
    rows: Vec<MeasurementRow<L>>,
    secondary_sphericity: bool,
}

impl<L> Default for MeasurementTable<L> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            secondary_sphericity: false,
        }
    }
}

impl<L: Label> MeasurementTable<L> {
    /// An empty table. `secondary_sphericity` selects the 9-column schema.
    pub fn new(secondary_sphericity: bool) -> Self {
        Self {
            rows: Vec::new(),
            secondary_sphericity,
        }
    }

    /// Build from rows in any order. Rows are sorted by label.
    pub fn from_rows(mut rows: Vec<MeasurementRow<L>>, secondary_sphericity: bool) -> Self {
        rows.sort_by(|a, b| a.label.cmp(&b.label));
        Self {
            rows,
            secondary_sphericity,
        }
    }

    /// Append a row. Callers push in ascending label order.
    pub(crate) fn push(&mut self, row: MeasurementRow<L>) {
        debug_assert!(self.rows.last().is_none_or(|last| last.label < row.label));
        self.rows.push(row);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MeasurementRow<L>> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[MeasurementRow<L>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<MeasurementRow<L>> {
        self.rows
    }

    /// True if the table carries the `sphericity_diplib` column.
    pub fn has_secondary_sphericity(&self) -> bool {
        self.secondary_sphericity
    }

    /// Row for `label`, if present.
    pub fn get(&self, label: L) -> Option<&MeasurementRow<L>> {
        self.rows
            .binary_search_by(|row| row.label.cmp(&label))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Labels in row order.
    pub fn labels(&self) -> Vec<L> {
        self.rows.iter().map(|row| row.label).collect()
    }

    /// Column names in output order.
    pub fn column_names(&self) -> Vec<&'static str> {
        let mut names = BASE_COLUMNS.to_vec();
        if self.secondary_sphericity {
            names.push(SECONDARY_COLUMN);
        }
        names
    }

    /// A numeric column by name.
    ///
    /// Returns `None` for `label`, for unknown names, and for the secondary
    /// column when the table was built without it.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        if !self.column_names().contains(&name) || name == "label" {
            return None;
        }
        self.rows.iter().map(|row| row.value(name)).collect()
    }

    /// Write as CSV with a header line and a leading row-index column.
    ///
    /// Floats use Rust's shortest round-trip formatting.
    pub fn write_csv<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        let names = self.column_names();
        writeln!(writer, ",{}", names.join(","))?;

        for (i, row) in self.rows.iter().enumerate() {
            write!(
                writer,
                "{},{:?},{},{},{},{},{},{},{}",
                i,
                row.label,
                row.surface_area,
                row.volume,
                row.convex_hull_area,
                row.convex_hull_volume,
                row.solidity,
                row.sphericity_wadell,
                row.sphericity_legland
            )?;
            if self.secondary_sphericity {
                match row.sphericity_diplib {
                    Some(v) => write!(writer, ",{}", v)?,
                    None => write!(writer, ",")?,
                }
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

impl<'a, L> IntoIterator for &'a MeasurementTable<L> {
    type Item = &'a MeasurementRow<L>;
    type IntoIter = std::slice::Iter<'a, MeasurementRow<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl<L: Label> fmt::Display for MeasurementTable<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.column_names();
        let widths: Vec<usize> = names.iter().map(|n| n.len().max(10)).collect();

        for (name, width) in names.iter().zip(&widths) {
            write!(f, "{:>width$} ", name, width = width)?;
        }
        writeln!(f)?;

        for row in &self.rows {
            write!(f, "{:>width$} ", format!("{:?}", row.label), width = widths[0])?;
            for (name, width) in names.iter().zip(&widths).skip(1) {
                match row.value(name) {
                    Some(v) => write!(f, "{:>width$.4} ", v, width = width)?,
                    None => write!(f, "{:>width$} ", "-", width = width)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: u16, diplib: Option<f64>) -> MeasurementRow<u16> {
        MeasurementRow {
            label,
            surface_area: 10.0 * label as f64,
            volume: 2.0,
            convex_hull_area: 12.0,
            convex_hull_volume: 2.5,
            solidity: 0.8,
            sphericity_wadell: 0.9,
            sphericity_legland: 0.729,
            sphericity_diplib: diplib,
        }
    }

    #[test]
    fn test_from_rows_sorts() {
        let table = MeasurementTable::from_rows(vec![row(5, None), row(1, None), row(2, None)], false);
        assert_eq!(table.labels(), vec![1, 2, 5]);
        assert_eq!(table.get(2).unwrap().surface_area, 20.0);
        assert!(table.get(3).is_none());
    }

    #[test]
    fn test_column_names() {
        let plain: MeasurementTable<u16> = MeasurementTable::new(false);
        assert_eq!(plain.column_names(), BASE_COLUMNS.to_vec());

        let extended: MeasurementTable<u16> = MeasurementTable::new(true);
        assert_eq!(extended.column_names().len(), 9);
        assert_eq!(extended.column_names()[8], "sphericity_diplib");
    }

    #[test]
    fn test_column_view() {
        let table = MeasurementTable::from_rows(vec![row(1, Some(1.3)), row(2, Some(1.4))], true);
        assert_eq!(table.column("surface_area"), Some(vec![10.0, 20.0]));
        assert_eq!(table.column("sphericity_diplib"), Some(vec![1.3, 1.4]));
        assert_eq!(table.column("label"), None);
        assert_eq!(table.column("perimeter"), None);

        let plain = MeasurementTable::from_rows(vec![row(1, None)], false);
        assert_eq!(plain.column("sphericity_diplib"), None);
    }

    #[test]
    fn test_csv_layout() {
        let table = MeasurementTable::from_rows(vec![row(3, Some(1.5))], true);
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            ",label,surface_area,volume,convex_hull_area,convex_hull_volume,solidity,sphericity_wadell,sphericity_legland,sphericity_diplib"
        );
        assert_eq!(lines[1], "0,3,30,2,12,2.5,0.8,0.9,0.729,1.5");
        assert_eq!(lines[1].split(',').count(), 10);
    }

    #[test]
    fn test_empty_table_csv_has_header_only() {
        let table: MeasurementTable<u8> = MeasurementTable::new(false);
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_display_lists_rows() {
        let table = MeasurementTable::from_rows(vec![row(1, None), row(7, None)], false);
        let text = table.to_string();
        assert!(text.contains("sphericity_legland"));
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("0.8000"));
    }
}
