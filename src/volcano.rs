use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use once_cell::unsync::Lazy;
use regex_lite::Regex;

#[derive(Debug)]
pub struct Volcano {
    pub graph: SquareArray,
    pub flow_for: HashMap<RoomHandle, usize>,
    pub name_for: HashMap<RoomHandle, String>,
    pub handle_for: HashMap<String, RoomHandle>,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomHandle(pub u8);

impl RoomHandle {
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for RoomHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Volcano {
    pub fn flow(&self, name: &str) -> usize {
        let i = self.handle_for[name];
        self.flow_for[&i]
    }

    pub fn handle(&self, name: &str) -> Option<RoomHandle> {
        self.handle_for.get(name).copied()
    }

    pub fn name(&self, rh: RoomHandle) -> &str {
        self.name_for[&rh].as_str()
    }

    // Rooms worth opening, in handle order. Handle order is input-line order,
    // so it's stable for a given input.
    pub fn working_rooms(&self) -> Vec<RoomHandle> {
        let mut rooms: Vec<RoomHandle> = self.flow_for.iter()
            .filter(|(_, &flow)| flow > 0)
            .map(|(&rh, _)| rh)
            .collect();
        rooms.sort();
        rooms
    }

    pub fn child_names(&self, name: &str) -> Vec<&str> {
        let src = self.handle_for[name];
        self.graph.row(src.as_usize()).iter().enumerate()
            .filter(|&(dst, w)| w.is_some() && src.as_usize() != dst)
            .map(|(i, _)| self.name_for[&RoomHandle(i as u8)].as_str())
            .collect::<Vec<_>>()
    }
}

impl FromStr for Volcano {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // eg: Valve AA has flow rate=0; tunnels lead to valves DD, II, BB
        let line_re = Lazy::new(|| {
            Regex::new(r#"Valve ([A-Z]{2}) has flow rate=(\d+); tunnel(?:s)? lead(?:s)? to valve(?:s)? (.*)"#).unwrap()
        });

        // Parse every line before wiring up edges so that a tunnel to a valve
        // that no line defines is an error instead of a half-built row.
        let mut records: Vec<(String, usize, Vec<String>)> = Vec::new();
        for line in s.lines() {
            let Some(caps) = line_re.captures(line) else {
                return Err(format!("unexpected line format: {line}").into());
            };
            let name = caps[1].to_string();
            let flow_rate: usize = caps[2].parse()?;
            let adjacent: Vec<String> = caps[3].split(", ").map(String::from).collect();
            records.push((name, flow_rate, adjacent));
        }

        if records.len() > u8::MAX as usize + 1 {
            return Err(format!("too many valves for u8 handles: {}", records.len()).into());
        }

        let mut graph = SquareArray::new(records.len());
        let mut flow_for = HashMap::new();
        let mut name_for = HashMap::new();
        let mut handle_for: HashMap<String, RoomHandle> = HashMap::new();

        for (i, (name, flow_rate, _)) in records.iter().enumerate() {
            let rh = RoomHandle(i as u8);
            handle_for.insert(name.clone(), rh);
            name_for.insert(rh, name.clone());
            flow_for.insert(rh, *flow_rate);
            graph.set(rh, rh, Some(0));
        }

        for (name, _, adjacent) in records.iter() {
            let src = handle_for[name];
            for neighbor in adjacent {
                let Some(&dst) = handle_for.get(neighbor) else {
                    return Err(format!("valve {neighbor} is referenced by {name} but never defined").into());
                };
                graph.set(src, dst, Some(1));
            }
        }

        Ok(Volcano { graph, flow_for, name_for, handle_for })
    }
}


#[derive(Clone, Debug)]
pub struct SquareArray {
    pub cols: usize,
    data: Vec<Option<usize>>,
}

impl SquareArray {
    pub fn new(cols: usize) -> Self {
        let mut data = Vec::new();
        data.resize(cols * cols, None);
        Self { cols, data }
    }

    pub fn get_raw(&self, src: usize, dst: usize) -> Option<usize> {
        self.data[src * self.cols + dst]
    }

    pub fn get(&self, src: RoomHandle, dst: RoomHandle) -> Option<usize> {
        self.get_raw(src.as_usize(), dst.as_usize())
    }

    pub fn set_raw(&mut self, src: usize, dst: usize, v: Option<usize>) {
        self.data[src * self.cols + dst] = v;
    }

    pub fn set(&mut self, src: RoomHandle, dst: RoomHandle, v: Option<usize>) {
        self.set_raw(src.as_usize(), dst.as_usize(), v);
    }

    pub fn row(&self, y: usize) -> &[Option<usize>] {
        let start = y * self.cols;
        &self.data[start..(start + self.cols)]
    }
}
