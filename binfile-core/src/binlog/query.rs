//! meaningful data structures and parsing logic of QueryEvent
use super::DataContext;
use bytes::{BufMut, Bytes, BytesMut};
use bytes_parser::error::{Error, Result};
use bytes_parser::{ReadBytesExt, ReadFromBytesWithContext, WriteToBytes};

// thread_id(4) + exec_time(4) + schema_len(1) + error_code(2) + status_vars_len(2)
const FIXED_LEN: usize = 13;

/// Data of QueryEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/query-event.html
/// only support binlog v4 (with status_vars_length at end of post header)
#[derive(Debug, Clone, PartialEq)]
pub struct QueryData {
    pub thread_id: u32,
    pub exec_time: u32,
    pub schema_len: u8,
    pub error_code: u16,
    pub status_vars_len: u16,
    // below is variable part
    pub status_vars: Bytes,
    pub schema: Bytes,
    // all remaining bytes of the event data, starting with
    // the NUL that terminates schema in files written by mysql
    pub query: Bytes,
}

impl QueryData {
    /// query data laid out as mysql writes it, with a NUL between schema and sql
    pub fn new(thread_id: u32, schema: &str, sql: &str) -> Result<Self> {
        if schema.len() > u8::MAX as usize {
            return Err(Error::ConstraintError(format!(
                "schema name too long: {}",
                schema
            )));
        }
        let mut query = BytesMut::with_capacity(sql.len() + 1);
        query.put_u8(0);
        query.put_slice(sql.as_bytes());
        Ok(QueryData {
            thread_id,
            exec_time: 0,
            schema_len: schema.len() as u8,
            error_code: 0,
            status_vars_len: 0,
            status_vars: Bytes::new(),
            schema: Bytes::copy_from_slice(schema.as_bytes()),
            query: query.freeze(),
        })
    }

    pub fn schema_str(&self) -> String {
        String::from_utf8_lossy(&self.schema).into_owned()
    }

    /// sql text with leading and trailing non-printable characters removed
    pub fn sql_display(&self) -> String {
        String::from_utf8_lossy(&self.query)
            .trim_matches(|c: char| c.is_control() || (c.is_whitespace() && c != ' '))
            .to_owned()
    }
}

/// sql length is not given by any field, it is what remains
/// of the data after fixed part, status vars and schema
impl ReadFromBytesWithContext<'_> for QueryData {
    type Context = DataContext;

    fn read_with_ctx(input: &mut Bytes, ctx: DataContext) -> Result<Self> {
        let data_len = ctx.data_len()?;
        let thread_id = input.read_le_u32()?;
        let exec_time = input.read_le_u32()?;
        let schema_len = input.read_u8()?;
        let error_code = input.read_le_u16()?;
        let status_vars_len = input.read_le_u16()?;
        // do not parse status_vars in this stage
        let status_vars = input.read_len(status_vars_len as usize)?;
        let schema = input.read_len(schema_len as usize)?;
        let query_len = data_len
            .checked_sub(FIXED_LEN + status_vars_len as usize + schema_len as usize)
            .ok_or_else(|| {
                Error::ConstraintError(format!(
                    "query data length {} less than {} with status vars length {} and schema length {}",
                    data_len, FIXED_LEN, status_vars_len, schema_len
                ))
            })?;
        let query = input.read_len(query_len)?;
        Ok(QueryData {
            thread_id,
            exec_time,
            schema_len,
            error_code,
            status_vars_len,
            status_vars,
            schema,
            query,
        })
    }
}

impl WriteToBytes for QueryData {
    fn write_to(&self, out: &mut BytesMut) -> Result<usize> {
        if self.status_vars.len() != self.status_vars_len as usize
            || self.schema.len() != self.schema_len as usize
        {
            return Err(Error::ConstraintError(format!(
                "inconsistent query lengths: status vars {}/{}, schema {}/{}",
                self.status_vars.len(),
                self.status_vars_len,
                self.schema.len(),
                self.schema_len
            )));
        }
        let start = out.len();
        out.put_u32_le(self.thread_id);
        out.put_u32_le(self.exec_time);
        out.put_u8(self.schema_len);
        out.put_u16_le(self.error_code);
        out.put_u16_le(self.status_vars_len);
        out.put_slice(&self.status_vars);
        out.put_slice(&self.schema);
        out.put_slice(&self.query);
        Ok(out.len() - start)
    }
}
