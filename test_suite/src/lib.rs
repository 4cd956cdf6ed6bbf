mod filtering;
mod parsing;
mod records;
