pub(crate) mod reader;
pub(crate) mod writer;

pub(crate) use reader::DumpReader;
pub(crate) use writer::DumpWriter;
