use crate::bencode::Bencode;

impl Bencode {
    /// Encodes the value in canonical form.
    ///
    /// Dictionary keys are written in ascending byte order at every level,
    /// whatever order they are stored in, so two dictionaries with the same
    /// entries always produce the same bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    /// Appends the canonical encoding of the value to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Bencode::String(s) => encode_bytes(s, out),
            Bencode::Integer(i) => {
                out.push(b'i');
                out.extend_from_slice(i.to_string().as_bytes());
                out.push(b'e');
            }
            Bencode::List(l) => {
                out.push(b'l');

                for value in l {
                    value.encode_into(out);
                }

                out.push(b'e');
            }
            Bencode::Dictionary(d) => {
                let mut entries: Vec<_> = d.iter().collect();
                entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

                out.push(b'd');

                for (key, value) in entries {
                    encode_bytes(key, out);
                    value.encode_into(out);
                }

                out.push(b'e');
            }
        }
    }
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(bytes);
}
