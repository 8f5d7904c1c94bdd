//! PendingQueue - 未確定注文の永続キュー
//!
//! # フォーマット
//! - CSV、ヘッダ行なし、1 行 1 注文
//! - 列は `Order::FIELDS` の順
//! - 空の Option は空セル
//!
//! ファイルが存在しないことが「空」の正規表現。空ファイルは作らない。

use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::StoreError;
use super::atomic::write_atomic;
use crate::domain::{Order, OrderId};

#[derive(Debug, Clone)]
pub struct PendingQueue {
    path: PathBuf,
}

impl PendingQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads every queued record. An absent store reads as empty.
    pub fn read_all(&self) -> Result<Vec<Order>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(file)
            .deserialize()
            .collect::<Result<Vec<Order>, _>>()
            .map_err(|source| self.malformed(source))
    }

    /// Adds orders to the store, creating it if needed.
    ///
    /// Orders whose id is already queued are skipped. Returns how many were
    /// added; nothing is written when that is zero.
    pub fn append(&self, orders: &[Order]) -> Result<usize, StoreError> {
        if orders.is_empty() {
            return Ok(0);
        }

        let mut records = self.read_all()?;
        let mut queued: HashSet<OrderId> = records.iter().map(|o| o.id).collect();
        let before = records.len();

        for order in orders {
            if queued.insert(order.id) {
                records.push(order.clone());
            } else {
                debug!(order_id = %order.id, "order already queued, skipping");
            }
        }

        let added = records.len() - before;
        if added > 0 {
            self.write_records(&records)?;
            info!(added, queued = records.len(), "Added order(s) to pending queue");
        }
        Ok(added)
    }

    /// Makes the store hold exactly `remaining`.
    ///
    /// An empty `remaining` deletes the store.
    pub fn replace(&self, remaining: &[Order]) -> Result<(), StoreError> {
        if remaining.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => {
                    info!(path = %self.path.display(), "Deleted pending queue");
                    Ok(())
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StoreError::io(&self.path, e)),
            };
        }

        self.write_records(remaining)?;
        info!(queued = remaining.len(), "Rewrote pending queue");
        Ok(())
    }

    fn write_records(&self, records: &[Order]) -> Result<(), StoreError> {
        let bytes = encode(records).map_err(|source| self.malformed(source))?;
        write_atomic(&self.path, &bytes)
    }

    fn malformed(&self, source: csv::Error) -> StoreError {
        StoreError::Malformed {
            path: self.path.clone(),
            source,
        }
    }
}

fn encode(records: &[Order]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::fixtures;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn queue() -> (TempDir, PendingQueue) {
        let dir = TempDir::new().unwrap();
        let queue = PendingQueue::new(dir.path().join("pending_orders.csv"));
        (dir, queue)
    }

    #[test]
    fn absent_store_reads_empty() {
        let (_dir, queue) = queue();
        assert!(!queue.exists());
        assert!(queue.read_all().unwrap().is_empty());
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let (_dir, queue) = queue();
        let mut full = fixtures::order(9, "Awaiting bank wire payment", 2000);
        full.total_paid = Decimal::new(1_999_990_000, 6);
        full.company_name = Some("Muster, GmbH".to_string());
        full.state = Some("Bayern".to_string());
        full.phone = Some("+49 89 123456".to_string());
        full.address = "Hauptstraße 1 \"Hinterhaus\"".to_string();
        let mut sparse = fixtures::order(10, "Awaiting check payment", 1600);
        sparse.company_name = None;
        sparse.state = None;
        sparse.phone = None;

        queue.append(&[full.clone(), sparse.clone()]).unwrap();

        assert_eq!(queue.read_all().unwrap(), vec![full, sparse]);
    }

    #[test]
    fn file_has_no_header_row() {
        let (_dir, queue) = queue();
        queue.append(&[fixtures::order(9, "Awaiting bank wire payment", 2000)]).unwrap();

        let text = fs::read_to_string(queue.path()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("9,REF00009,Awaiting bank wire payment,2000,"));
    }

    #[test]
    fn append_extends_and_skips_queued_ids() {
        let (_dir, queue) = queue();
        queue.append(&[fixtures::order(9, "Awaiting bank wire payment", 2000)]).unwrap();

        let added = queue
            .append(&[
                fixtures::order(9, "Awaiting check payment", 2000),
                fixtures::order(10, "Awaiting check payment", 2000),
            ])
            .unwrap();

        assert_eq!(added, 1);
        let ids: Vec<u64> = queue.read_all().unwrap().iter().map(|o| o.id.get()).collect();
        assert_eq!(ids, vec![9, 10]);
    }

    #[test]
    fn append_nothing_does_not_create_the_store() {
        let (_dir, queue) = queue();
        assert_eq!(queue.append(&[]).unwrap(), 0);
        assert!(!queue.exists());
    }

    #[test]
    fn replace_rewrites_exactly_the_remaining_records() {
        let (_dir, queue) = queue();
        queue
            .append(&[
                fixtures::order(9, "Awaiting bank wire payment", 2000),
                fixtures::order(10, "Awaiting bank wire payment", 2000),
            ])
            .unwrap();

        let keep = fixtures::order(10, "Awaiting check payment", 2000);
        queue.replace(std::slice::from_ref(&keep)).unwrap();

        assert_eq!(queue.read_all().unwrap(), vec![keep]);
    }

    #[test]
    fn replace_with_nothing_deletes_the_store() {
        let (_dir, queue) = queue();
        queue.append(&[fixtures::order(9, "Awaiting bank wire payment", 2000)]).unwrap();

        queue.replace(&[]).unwrap();

        assert!(!queue.exists());
        // deleting an absent store is fine too
        queue.replace(&[]).unwrap();
    }

    #[test]
    fn malformed_row_is_reported() {
        let (_dir, queue) = queue();
        fs::write(queue.path(), "not,a,valid,row\n").unwrap();

        assert!(matches!(queue.read_all(), Err(StoreError::Malformed { .. })));
    }
}
