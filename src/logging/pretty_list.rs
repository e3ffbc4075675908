use std::fmt;

/// Renders a slice as a bulleted list, one entry per line.
///
/// Useful when a log line reports a collection, like the set of enabled
/// validation layers or the memory types a device offers. The list starts on
/// its own line so the multiline log formatter indents it as a block.
pub struct PrettyList<'a, T>(pub &'a [T]);

impl<'a, T> fmt::Display for PrettyList<'a, T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for entry in self.0 {
            writeln!(f, "- {}", entry)?;
        }
        Ok(())
    }
}

impl<'a, T> fmt::Debug for PrettyList<'a, T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for entry in self.0 {
            if f.alternate() {
                writeln!(f, "- {:#?}", entry)?;
            } else {
                writeln!(f, "- {:?}", entry)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn entries_render_one_per_line() {
        let rendered = format!("{}", PrettyList(&["alpha", "beta"]));
        assert_eq!(rendered, "\n- alpha\n- beta\n");
    }

    #[test]
    fn an_empty_list_is_just_a_newline() {
        let rendered = format!("{}", PrettyList::<&str>(&[]));
        assert_eq!(rendered, "\n");
    }
}
