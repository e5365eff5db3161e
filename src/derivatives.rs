use ndarray::{azip, s, Array2, ArrayView2, Axis};

/// Signed differences between every pixel and its four cardinal neighbors.
///
/// Each array has the shape of the image. The border that has no neighbor in
/// a given direction holds zeros, which is what gives the scheme its zero-flux
/// boundary condition.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalDifferences {
    /// `I(i-1, j) - I(i, j)`, zero on the first row
    pub north: Array2<f32>,
    /// `I(i+1, j) - I(i, j)`, zero on the last row
    pub south: Array2<f32>,
    /// `I(i, j-1) - I(i, j)`, zero on the first column
    pub east: Array2<f32>,
    /// `I(i, j+1) - I(i, j)`, zero on the last column
    pub west: Array2<f32>,
}

impl DirectionalDifferences {
    pub fn compute(image: ArrayView2<f32>) -> Self {
        let dim = image.dim();
        let mut north = Array2::<f32>::zeros(dim);
        let mut south = Array2::<f32>::zeros(dim);
        let mut east = Array2::<f32>::zeros(dim);
        let mut west = Array2::<f32>::zeros(dim);
        // Vertical neighbors.
        azip!((
            dn in north.slice_mut(s![1.., ..]),
            ds in south.slice_mut(s![..-1, ..]),
            &above in image.slice(s![..-1, ..]),
            &below in image.slice(s![1.., ..]),
        ) {
            *dn = above - below;
            *ds = below - above;
        });
        // Horizontal neighbors.
        azip!((
            de in east.slice_mut(s![.., 1..]),
            dw in west.slice_mut(s![.., ..-1]),
            &left in image.slice(s![.., ..-1]),
            &right in image.slice(s![.., 1..]),
        ) {
            *de = left - right;
            *dw = right - left;
        });
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// The four arrays in north, south, east, west order.
    pub fn as_array(&self) -> [&Array2<f32>; 4] {
        [&self.north, &self.south, &self.east, &self.west]
    }
}

/// First derivative along one axis.
///
/// Interior samples use the central difference `(f[i+1] - f[i-1]) / 2`, the
/// two border samples use one-sided differences. An axis of length 1 has a
/// zero derivative.
pub fn gradient(image: ArrayView2<f32>, axis: Axis) -> Array2<f32> {
    let mut output = Array2::<f32>::zeros(image.dim());
    let len = image.len_of(axis);
    if len < 2 {
        return output;
    }
    for (mut out, lane) in output.lanes_mut(axis).into_iter().zip(image.lanes(axis)) {
        out[0] = lane[1] - lane[0];
        out[len - 1] = lane[len - 1] - lane[len - 2];
        for i in 1..len - 1 {
            out[i] = 0.5 * (lane[i + 1] - lane[i - 1]);
        }
    }
    output
}

/// Derivative along the columns direction (x).
pub fn gradient_x(image: ArrayView2<f32>) -> Array2<f32> {
    gradient(image, Axis(1))
}

/// Derivative along the rows direction (y).
pub fn gradient_y(image: ArrayView2<f32>) -> Array2<f32> {
    gradient(image, Axis(0))
}
