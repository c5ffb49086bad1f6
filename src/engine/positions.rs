use crate::domain::{SeatIndex, Table};

/// Следующее место по кругу. Места за столом идут без пропусков.
pub fn next_seat(table: &Table, seat: SeatIndex) -> Option<SeatIndex> {
    let count = table.seated_count();
    if count == 0 {
        return None;
    }
    Some((seat + 1) % count)
}

/// Новый индекс хозяина после ухода игрока с места `removed`.
///
/// Ушёл сам хозяин: хозяином становится место 0 (если кто-то остался).
/// Ушёл кто-то раньше хозяина: индекс сдвигается вниз.
pub fn host_after_leave(host: SeatIndex, removed: SeatIndex) -> SeatIndex {
    if removed == host {
        0
    } else if removed < host {
        host - 1
    } else {
        host
    }
}
