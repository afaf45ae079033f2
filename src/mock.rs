//! A mock driver registered under the `mock://` scheme.
//!
//! Only available when running tests or when the `mock` feature is enabled. The behavior of the driver is derived
//! from the statement text:
//!
//! - opening a connection with the URI `mock://?error` returns an error
//! - preparing `XINSERT` returns an error
//! - `SELECT <n>` queried returns a single batch of `n` records (`n == 0`: no records, `n < 0`: a cursor failing
//!   at the first fetch), anything else queried returns an error
//! - executing an update on a `SELECT ...` returns an error, anything else affects 1 row
//! - a statement containing `FATAL` fails with an error the connection reports as fatal
//! - a statement containing `FAILCLOSE` fails when closed
//! - a statement containing `BADMETA` fails to retrieve its parameter metadata

use crate::driver::{
    CursorId, DriverConnection, DriverCursor, DriverError, DriverFactory, DriverStatement, GeneratedKeys, Result,
};
use crate::factory::Factory;
use crate::parameters::Parameters;
use crate::Error;
use arrow_array::RecordBatch;
use ctor::ctor;
use std::any::Any;

pub struct MockFactory {}

impl DriverFactory for MockFactory {
    fn schemes(&self) -> &'static [&'static str] {
        &["mock"]
    }

    fn open(&self, uri: &str) -> Result<Box<dyn DriverConnection>> {
        match uri.contains("?error") {
            false => Ok(Box::new(MockConnection {})),
            true => Err("Invalid URI".into()),
        }
    }
}

pub struct MockConnection {}

impl DriverConnection for MockConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    fn prepare(&self, statement: &str) -> Result<Box<dyn DriverStatement>> {
        match statement {
            "XINSERT" => Err("Invalid statement".into()),
            _ => Ok(Box::new(MockStatement::new(statement))),
        }
    }

    fn is_fatal(&self, error: &DriverError) -> bool {
        error.to_string().contains("fatal")
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

pub struct MockStatement {
    prepared: String,
    bound: Option<Parameters>,
    batch: Vec<String>,
    current_cursor: Option<(CursorId, i64)>,
    generation: CursorId,
}

impl MockStatement {
    fn new(prepared: &str) -> Self {
        Self { prepared: prepared.to_string(), bound: None, batch: Vec::new(), current_cursor: None, generation: 0 }
    }

    fn check_fatal(statement: &str) -> Result<()> {
        match statement.contains("FATAL") {
            true => Err("fatal: connection lost".into()),
            false => Ok(()),
        }
    }

    fn row_count(statement: &str) -> Result<i64> {
        match regex::Regex::new(r"^SELECT\s+(-?[0-9]+)").unwrap().captures(statement) {
            Some(captures) => Ok(captures.get(1).unwrap().as_str().parse::<i64>().unwrap()),
            None => Err(format!("Invalid statement: {}", statement).into()),
        }
    }
}

impl DriverStatement for MockStatement {
    fn bind(&mut self, parameters: Parameters) -> Result<()> {
        let expected = self.prepared.matches('?').count();
        if expected != parameters.len() {
            return Err(Box::new(Error::InvalidParameterCount { expected, actual: parameters.len() }));
        }
        self.bound = Some(parameters);
        Ok(())
    }

    fn add_batch(&mut self, statement: &str) -> Result<()> {
        self.batch.push(statement.to_string());
        Ok(())
    }

    fn execute(&mut self, statement: &str, _keys: GeneratedKeys) -> Result<bool> {
        Self::check_fatal(statement)?;
        if statement.starts_with("SELECT") {
            let rows = Self::row_count(statement)?;
            self.generation += 1;
            self.current_cursor = Some((self.generation, rows));
            Ok(true)
        } else {
            self.current_cursor = None;
            Ok(false)
        }
    }

    fn execute_query(&mut self, statement: &str) -> Result<Box<dyn DriverCursor>> {
        Self::check_fatal(statement)?;
        let rows = Self::row_count(statement)?;
        self.generation += 1;
        self.current_cursor = Some((self.generation, rows));
        Ok(Box::new(MockCursor::new(self.generation, rows)))
    }

    fn execute_update(&mut self, statement: &str, _keys: GeneratedKeys) -> Result<u32> {
        Self::check_fatal(statement)?;
        match statement.starts_with("SELECT") {
            false => {
                self.current_cursor = None;
                Ok(1)
            }
            true => Err("Invalid statement".into()),
        }
    }

    fn execute_large_update(&mut self, statement: &str, _keys: GeneratedKeys) -> Result<u64> {
        self.execute_update(statement, _keys).map(u64::from)
    }

    fn execute_batch(&mut self) -> Result<Vec<u32>> {
        for statement in &self.batch {
            Self::check_fatal(statement)?;
        }
        let counts = vec![1; self.batch.len()];
        self.batch.clear();
        Ok(counts)
    }

    fn execute_large_batch(&mut self) -> Result<Vec<u64>> {
        self.execute_batch().map(|counts| counts.into_iter().map(u64::from).collect())
    }

    fn result_set(&mut self) -> Result<Option<Box<dyn DriverCursor>>> {
        Ok(self.current_cursor.map(|(id, rows)| Box::new(MockCursor::new(id, rows)) as Box<dyn DriverCursor>))
    }

    fn parameter_metadata(&self) -> Result<Option<String>> {
        if self.prepared.contains("BADMETA") {
            return Err("metadata unavailable".into());
        }
        Ok(self.bound.as_ref().map(|parameters| parameters.to_string()))
    }

    fn describe(&self) -> String {
        format!("mock statement [{}]", self.prepared)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn close(&mut self) -> Result<()> {
        match self.prepared.contains("FAILCLOSE") {
            true => Err("close failed".into()),
            false => Ok(()),
        }
    }
}

pub struct MockCursor {
    id: CursorId,
    rows: i64,
    served: bool,
}

impl MockCursor {
    fn new(id: CursorId, rows: i64) -> Self {
        Self { id, rows, served: false }
    }
}

impl DriverCursor for MockCursor {
    fn id(&self) -> CursorId {
        self.id
    }

    fn next_batch(&mut self) -> Result<Option<RecordBatch>> {
        if self.rows < 0 {
            return Err("Invalid count".into());
        }
        if self.served || self.rows == 0 {
            return Ok(None);
        }
        self.served = true;
        let ids: Vec<Option<i32>> = (1..=self.rows).map(|n| Some(n as i32)).collect();
        let usernames: Vec<Option<String>> = (1..=self.rows).map(|n| Some(format!("user{}", n))).collect();
        let record_batch = RecordBatch::try_new(
            std::sync::Arc::new(arrow_schema::Schema::new(vec![
                arrow_schema::Field::new("id", arrow_schema::DataType::Int32, true),
                arrow_schema::Field::new("username", arrow_schema::DataType::Utf8, true),
            ])),
            vec![
                std::sync::Arc::new(arrow_array::Int32Array::from(ids)),
                std::sync::Arc::new(arrow_array::StringArray::from(usernames)),
            ],
        )
        .map_err(|e| Box::new(e) as DriverError)?;
        Ok(Some(record_batch))
    }
}

pub fn register_driver() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        Factory::register(Box::new(MockFactory {}));
    });
}

#[ctor]
fn init() {
    register_driver();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_statement() {
        let conn = MockConnection {};
        assert!(conn.prepare("XINSERT").is_err());

        let mut stmt = MockStatement::new("SELECT ?");
        assert!(stmt.bind(crate::params!(1, 2)).is_err());
        assert!(stmt.bind(crate::params!(1)).is_ok());
        assert_eq!(stmt.parameter_metadata().unwrap(), Some("[1]".to_string()));

        // Executing a SELECT produces a new cursor generation every time.
        assert!(stmt.execute("SELECT 1", GeneratedKeys::None).unwrap());
        let first = stmt.result_set().unwrap().unwrap().id();
        assert_eq!(stmt.result_set().unwrap().unwrap().id(), first);
        assert!(stmt.execute("SELECT 1", GeneratedKeys::None).unwrap());
        assert!(stmt.result_set().unwrap().unwrap().id() > first);

        // Executing an update clears the current cursor.
        assert_eq!(stmt.execute_update("INSERT 1", GeneratedKeys::None).unwrap(), 1);
        assert!(stmt.result_set().unwrap().is_none());
        assert!(stmt.execute_update("SELECT 1", GeneratedKeys::None).is_err());
    }

    #[test]
    fn test_mock_batches() {
        let mut stmt = MockStatement::new("INSERT");
        stmt.add_batch("INSERT 1").unwrap();
        stmt.add_batch("INSERT 2").unwrap();
        assert_eq!(stmt.execute_batch().unwrap(), vec![1, 1]);
        // The batch is consumed.
        assert!(stmt.execute_large_batch().unwrap().is_empty());
    }

    #[test]
    fn test_mock_cursor() {
        let mut cursor = MockCursor::new(1, 2);
        assert_eq!(cursor.next_batch().unwrap().unwrap().num_rows(), 2);
        assert!(cursor.next_batch().unwrap().is_none());

        let mut cursor = MockCursor::new(1, 0);
        assert!(cursor.next_batch().unwrap().is_none());

        let mut cursor = MockCursor::new(1, -1);
        assert!(cursor.next_batch().is_err());
    }
}
