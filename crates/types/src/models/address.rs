use alloy_primitives::Address;

/// Parse a 0x-prefixed 20-byte hex address, ignoring checksum casing
pub fn parse_address(value: &str) -> Option<Address> {
	let hex = value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))?;
	if hex.len() != 40 {
		return None;
	}
	hex.parse::<Address>().ok()
}

/// Whether `value` is a 0x-prefixed 20-byte hex address
pub fn is_valid_address(value: &str) -> bool {
	parse_address(value).is_some()
}

/// Whether two strings name the same account; invalid addresses never match
pub fn same_address(a: &str, b: &str) -> bool {
	match (parse_address(a), parse_address(b)) {
		(Some(a), Some(b)) => a == b,
		_ => false,
	}
}
