//! Scripted LDAP responder for exercising the adapter over real sockets.
//!
//! Requests are framed by their BER header and answered with whatever the
//! script returns, wrapped in an LDAPMessage carrying the request's id.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const BIND_REQUEST: u8 = 0x60;
pub const SEARCH_REQUEST: u8 = 0x63;
const UNBIND_REQUEST: u8 = 0x42;

pub const RC_SUCCESS: u8 = 0;
pub const RC_NO_SUCH_OBJECT: u8 = 32;
pub const RC_INSUFFICIENT_ACCESS: u8 = 50;
pub const RC_INVALID_CREDENTIALS: u8 = 49;

/// What the server does with one request
pub enum Reply {
    /// Send these protocol ops, in order
    Send(Vec<Vec<u8>>),
    /// Close the connection without answering
    Hangup,
}

/// One decoded request
pub struct Request<'a> {
    pub op: u8,
    /// Searches already answered on this connection
    pub searches_seen: usize,
    pub raw: &'a [u8],
}

pub type Script = fn(&Request<'_>) -> Reply;

/// Listen on a loopback port and answer every connection with `script`.
pub async fn spawn(script: Script) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, script));
        }
    });

    format!("ldap://{}", addr)
}

/// URL of a loopback port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ldap://{}", addr)
}

/// Answers binds with success and hands searches to `search`.
pub fn bind_then(op: u8, search: impl FnOnce() -> Reply) -> Reply {
    match op {
        BIND_REQUEST => Reply::Send(vec![bind_response(RC_SUCCESS)]),
        SEARCH_REQUEST => search(),
        _ => Reply::Hangup,
    }
}

async fn serve(mut stream: TcpStream, script: Script) {
    let mut searches_seen = 0;

    while let Some(message) = read_message(&mut stream).await {
        let Some((message_id, op)) = split_message(&message) else {
            return;
        };
        if op == UNBIND_REQUEST {
            return;
        }

        let reply = script(&Request {
            op,
            searches_seen,
            raw: &message,
        });
        if op == SEARCH_REQUEST {
            searches_seen += 1;
        }

        match reply {
            Reply::Hangup => return,
            Reply::Send(ops) => {
                for protocol_op in ops {
                    let response = tlv(0x30, &[message_id.clone(), protocol_op].concat());
                    if stream.write_all(&response).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

async fn read_message(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut head = [0u8; 2];
    stream.read_exact(&mut head).await.ok()?;
    let mut message = head.to_vec();

    let content_len = if head[1] & 0x80 == 0 {
        usize::from(head[1])
    } else {
        let mut len_bytes = vec![0u8; usize::from(head[1] & 0x7f)];
        stream.read_exact(&mut len_bytes).await.ok()?;
        message.extend_from_slice(&len_bytes);
        len_bytes
            .iter()
            .fold(0usize, |acc, byte| (acc << 8) | usize::from(*byte))
    };

    let mut content = vec![0u8; content_len];
    stream.read_exact(&mut content).await.ok()?;
    message.extend_from_slice(&content);
    Some(message)
}

/// Message id TLV and protocol op tag of an LDAPMessage.
fn split_message(message: &[u8]) -> Option<(Vec<u8>, u8)> {
    let len_byte = *message.get(1)?;
    let header = if len_byte & 0x80 == 0 {
        2
    } else {
        2 + usize::from(len_byte & 0x7f)
    };

    let content = message.get(header..)?;
    if *content.first()? != 0x02 {
        return None;
    }
    let id_end = 2 + usize::from(*content.get(1)?);
    Some((content.get(..id_end)?.to_vec(), *content.get(id_end)?))
}

pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else if len <= 0xff {
        out.extend_from_slice(&[0x81, len as u8]);
    } else {
        out.extend_from_slice(&[0x82, (len >> 8) as u8, len as u8]);
    }
    out.extend_from_slice(content);
    out
}

fn octets(value: &[u8]) -> Vec<u8> {
    tlv(0x04, value)
}

fn ldap_result(tag: u8, rc: u8) -> Vec<u8> {
    tlv(tag, &[vec![0x0a, 0x01, rc], octets(b""), octets(b"")].concat())
}

pub fn bind_response(rc: u8) -> Vec<u8> {
    ldap_result(0x61, rc)
}

pub fn search_done(rc: u8) -> Vec<u8> {
    ldap_result(0x65, rc)
}

pub fn search_entry(dn: &str, attrs: &[(&str, &[u8])]) -> Vec<u8> {
    let attributes: Vec<u8> = attrs
        .iter()
        .flat_map(|(name, value)| {
            tlv(
                0x30,
                &[octets(name.as_bytes()), tlv(0x31, &octets(value))].concat(),
            )
        })
        .collect();
    tlv(0x64, &[octets(dn.as_bytes()), tlv(0x30, &attributes)].concat())
}

/// True when `needle` occurs in the raw request.
pub fn contains(raw: &[u8], needle: &[u8]) -> bool {
    raw.windows(needle.len()).any(|window| window == needle)
}
