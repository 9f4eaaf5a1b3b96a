/// Render a call in escape syntax
///
/// Produces `{call ns.schema.name(?,?)}` for procedures and
/// `{ ? = call ns.schema.name(?)}` for functions. Absent or empty qualifiers
/// are skipped. `parameter_count` never includes the `?=` slot.
///
/// # Examples
///
/// ```
/// use sprocket_dispatch::build_call_string;
///
/// assert_eq!(
///     build_call_string(None, Some("app"), "plus", 3, false),
///     "{call app.plus(?,?,?)}"
/// );
/// assert_eq!(
///     build_call_string(Some("pkg"), None, "next_id", 0, true),
///     "{ ? = call pkg.next_id()}"
/// );
/// ```
pub fn build_call_string(
    namespace: Option<&str>,
    schema: Option<&str>,
    name: &str,
    parameter_count: usize,
    function: bool,
) -> String {
    let mut call = String::with_capacity(name.len() + 2 * parameter_count + 24);
    call.push_str(if function { "{ ? = call " } else { "{call " });

    for qualifier in [namespace, schema].into_iter().flatten() {
        if qualifier.is_empty() {
            continue;
        }
        call.push_str(qualifier);
        call.push('.');
    }

    call.push_str(name);
    call.push('(');
    for i in 0..parameter_count {
        if i > 0 {
            call.push(',');
        }
        call.push('?');
    }
    call.push_str(")}");
    call
}
