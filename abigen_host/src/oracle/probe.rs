//! The C program which asks the host toolchain for the catalog values.
//!
//! Every catalog entry turns into one `printf` producing a line `<kind> <key> <value>`:
//! `const NAME 44672`, `size kvm_run.io 32` or `align kvm_regs 8`. Values are printed in decimal,
//! signed widths through `long long` so negative values survive.

use crate::{Error, Result};
use abigen_common::{Catalog, KVM_HEADER, LayoutSubject, Metric, Resolution};
use std::fmt::Write;

const PROLOGUE: &str = "\
#include <stdalign.h> // alignof operator
#include <stddef.h>
#include <stdio.h>

int main(void) {
";

const EPILOGUE: &str = "\
    return 0;
}
";

/// C expression whose `sizeof` / `alignof` is the value of the subject.
fn c_operand(subject: &LayoutSubject) -> String {
    match subject.field_name() {
        Some(field) => format!("((struct {} *)0)->{}", subject.record_name(), field),
        None => format!("struct {}", subject.record_name()),
    }
}

/// Generate the probe source for `catalog`.
pub(crate) fn source(catalog: &Catalog) -> String {
    let mut src = format!("#include <{}>\n\n{}", KVM_HEADER, PROLOGUE);

    for entry in catalog.constants() {
        let (fmt, cast) = match entry.width.is_signed() {
            true => ("%lld", "long long"),
            false => ("%llu", "unsigned long long"),
        };
        // writing to a String can not fail
        let _ = writeln!(
            src,
            "    printf(\"const {name} {fmt}\\n\", ({cast})({name}));",
            name = entry.name,
        );
    }

    for entry in catalog.layouts() {
        let operator = match entry.metric {
            Metric::Size => "sizeof",
            Metric::Align => "alignof",
        };
        let _ = writeln!(
            src,
            "    printf(\"{metric} {key} %zu\\n\", {operator}({operand}));",
            metric = entry.metric,
            key = entry.subject.key(),
            operand = c_operand(&entry.subject),
        );
    }

    src.push_str(EPILOGUE);
    src
}

/// Parse the output of the probe into a resolution named `source`.
pub(crate) fn parse(output: &str, source: &str) -> Result<Resolution> {
    let mut res = Resolution::new(source);

    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let invalid = |reason| Error::ProbeOutput {
            line: line.to_string(),
            reason,
        };

        let mut parts = line.split_whitespace();
        let (Some(kind), Some(key), Some(value), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected '<kind> <key> <value>'"));
        };

        match kind {
            "const" => {
                let value = value
                    .parse::<i128>()
                    .map_err(|_| invalid("constant is not an integer"))?;
                res.insert_constant(key, value);
            }
            "size" | "align" => {
                if !LayoutSubject::is_valid_key(key) {
                    return Err(invalid("invalid layout subject"));
                }
                let value = value
                    .parse::<usize>()
                    .map_err(|_| invalid("layout value is not a byte count"))?;
                let metric = match kind {
                    "size" => Metric::Size,
                    _ => Metric::Align,
                };
                res.insert_layout(key, metric, value);
            }
            _ => return Err(invalid("unknown kind")),
        }
    }

    Ok(res)
}
