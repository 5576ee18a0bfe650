use crate::RecordTable;

/// Put the target column as first column, all other columns keep their order.
pub fn assemble_output(mut table: RecordTable, target_column: &str) -> RecordTable {
    if !table.move_column_to_front(target_column) {
        tracing::debug!("Column '{target_column}' is not present so could not be moved");
    }
    table
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn target_first() {
        let mut table = RecordTable::new(["Protein", "Intensity", "hgnc_symbol"]).unwrap();
        table.push_row(["P60709", "12", "ACTB"]).unwrap();
        let table = assemble_output(table, "hgnc_symbol");
        assert_eq!(
            table.header().collect_vec(),
            ["hgnc_symbol", "Protein", "Intensity"]
        );
        assert_eq!(table.rows().collect_vec(), [vec!["ACTB", "P60709", "12"]]);
        let table = assemble_output(table, "hgnc_symbol");
        assert_eq!(
            table.header().collect_vec(),
            ["hgnc_symbol", "Protein", "Intensity"]
        );
    }
}
