use std::net::Ipv4Addr;

//------------ IPv4 bit arithmetic ------------------------------------------
//
// IPv4 is the only address family the index knows about. Addresses and
// networks are handled as plain u32 values in network (big-endian) bit
// order: bit 0 is the most significant bit of the first octet.

/// The number of bits in an IPv4 address.
pub const BITS: u8 = 32;

/// Pack the four octets of an address into a u32, first octet in the most
/// significant byte.
pub fn from_ipaddr(addr: Ipv4Addr) -> u32 {
    let [a, b, c, d] = addr.octets();
    (a as u32) << 24 | (b as u32) << 16 | (c as u32) << 8 | d as u32
}

/// Turn the bits back into an [Ipv4Addr].
pub fn into_ipaddr(bits: u32) -> Ipv4Addr {
    Ipv4Addr::new(
        (bits >> 24) as u8,
        (bits >> 16) as u8,
        (bits >> 8) as u8,
        bits as u8,
    )
}

/// Fill the bits after the specified len with zeros. Interpreted as an IP
/// prefix, this means that the network will be truncated to `len`.
pub fn truncate_to_len(bits: u32, len: u8) -> u32 {
    match len {
        0 => 0,
        l if l >= BITS => bits,
        l => bits & (u32::MAX << (BITS - l)),
    }
}

/// Returns the bit at position `pos`, counted from the most significant
/// bit. Positions past the end of the address read as zero.
pub fn bit_at(bits: u32, pos: u8) -> bool {
    if pos >= BITS {
        return false;
    }
    (bits >> (BITS - 1 - pos)) & 1 == 1
}
